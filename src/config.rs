use serde::{Deserialize, Serialize, Serializer};
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::errors::ConfigError;
use crate::i18n::Locale;
use crate::render::UnparseablePolicy;
use crate::shortcode;

/// Config file read when `--config` is not given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "asamblea.toml";

/// Prefix for environment overrides, e.g. `ASAMBLEA_PORT=8080`.
pub const ENV_PREFIX: &str = "ASAMBLEA_";

fn default_debug_param() -> String {
    "debug_asamblea".to_string()
}

fn default_shortcode_tag() -> String {
    shortcode::DEFAULT_TAG.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IpArray(pub [u8; 4]);

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub host: IpArray,
    pub port: u16,
    /// Directory of HTML content pages served by the host. Pages may contain
    /// the shortcode anywhere in their markup.
    pub content_dir: PathBuf,
    /// JSON file holding the configured YouTube URL.
    pub settings_file: PathBuf,
    /// Optional folder with `page.html`, `admin.html` and `asamblea.css`
    /// overriding the compiled defaults.
    #[serde(default)]
    pub template_folder: Option<PathBuf>,
    /// Credential that makes a request a privileged viewer, sent as
    /// `Authorization: Bearer <token>` or the `asamblea_admin` cookie.
    /// Unset means nobody is privileged and the admin page is closed.
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(default)]
    pub locale: Locale,
    /// `error` shows a placeholder for URLs that are not YouTube links;
    /// `passthrough` embeds them as-is.
    #[serde(default)]
    pub unparseable_policy: UnparseablePolicy,
    #[serde(default = "default_shortcode_tag")]
    pub shortcode_tag: String,
    /// Query parameter that asks for the diagnostic block.
    #[serde(default = "default_debug_param")]
    pub debug_param: String,
    /// Frame title; defaults to the locale's title.
    #[serde(default)]
    pub player_title: Option<String>,
}

impl std::fmt::Display for IpArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl std::str::FromStr for IpArray {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => Ok(IpArray(v4.octets())),
            _ => Err(ConfigError::InvalidHost {
                host: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for IpArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ip_str = String::deserialize(deserializer)?;
        let ip: IpAddr = ip_str.parse().map_err(serde::de::Error::custom)?;

        match ip {
            IpAddr::V4(v4) => Ok(IpArray(v4.octets())),
            IpAddr::V6(_) => Err(serde::de::Error::custom("IPv6 addresses are not supported")),
        }
    }
}

impl Serialize for IpArray {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ip = std::net::Ipv4Addr::from(self.0);
        serializer.serialize_str(&ip.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpArray([127, 0, 0, 1]),
            port: 5300,
            content_dir: PathBuf::from("content"),
            settings_file: PathBuf::from("asamblea-settings.json"),
            template_folder: None,
            admin_token: None,
            locale: Locale::default(),
            unparseable_policy: UnparseablePolicy::default(),
            shortcode_tag: default_shortcode_tag(),
            debug_param: default_debug_param(),
            player_title: None,
        }
    }
}

impl Config {
    /// Layer defaults, `ASAMBLEA_*` environment variables and the TOML file
    /// (later layers win), then validate.
    pub fn read(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Toml::file(config_file))
            .extract()
            .map_err(|e| ConfigError::ParseFailed(Box::new(e)))?;
        tracing::debug!("Loaded config: {:?}", &config.redacted());
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `port`: must be 1-65535
    /// - `shortcode_tag`: non-empty, letters/digits/`_`/`-` only
    /// - `debug_param`: same character rules as the tag
    /// - `admin_token`: if set, must not be blank
    /// - `template_folder`: if set, must be a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }

        if !is_identifier(&self.shortcode_tag) {
            return Err(ConfigError::InvalidShortcodeTag {
                tag: self.shortcode_tag.clone(),
            });
        }

        if !is_identifier(&self.debug_param) {
            return Err(ConfigError::InvalidDebugParam {
                name: self.debug_param.clone(),
            });
        }

        if self
            .admin_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(ConfigError::BlankAdminToken);
        }

        if let Some(folder) = &self.template_folder {
            if !folder.is_dir() {
                return Err(ConfigError::TemplateFolderNotDirectory {
                    path: folder.clone(),
                });
            }
        }

        Ok(())
    }

    /// Copy with the admin token masked, for logging.
    pub fn redacted(&self) -> Self {
        Self {
            admin_token: self.admin_token.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
