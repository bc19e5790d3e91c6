//! Key-value storage for the plugin's settings.
//!
//! The only key the player depends on is [`YOUTUBE_URL_KEY`]. Readers see
//! either the previous or the new value of a key, never a partial write.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::errors::StoreError;

/// Store key holding the raw configured YouTube URL.
pub const YOUTUBE_URL_KEY: &str = "asamblea_youtube_url";

pub trait SettingsStore: Send + Sync {
    /// Value for `key`, or an empty string when unset.
    fn get(&self, key: &str) -> String;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> String {
        self.values.read().get(key).cloned().unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a flat JSON object.
///
/// The file is the source of truth: every `get` reads it again, so a value
/// written by another process (e.g. `asamblea --set-url`) is picked up on the
/// next render. Writes go to a uniquely named temp file in the same directory
/// which is then renamed over the target, so a crash mid-write leaves the
/// previous file intact and concurrent writers never share a temp file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Last successfully read contents, served when the file turns unreadable.
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let path = path.into();
        let values = load(&path)?;
        tracing::debug!("opened settings store {} ({} keys)", path.display(), values.len());
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(values)?;
        let write_err = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Read the settings file. Missing or empty means no settings.
fn load(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(StoreError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> String {
        match load(&self.path) {
            Ok(fresh) => {
                let value = fresh.get(key).cloned().unwrap_or_default();
                *self.values.write() = fresh;
                value
            }
            Err(e) => {
                tracing::warn!("{e}; using last known settings");
                self.values.read().get(key).cloned().unwrap_or_default()
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Held across read-modify-write so writers in this process persist in order.
        let mut values = self.values.write();
        let mut next = load(&self.path)?;
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *values = next;
        tracing::info!("stored setting {key} in {}", self.path.display());
        Ok(())
    }
}
