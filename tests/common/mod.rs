//! Common test utilities for integration tests.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that creates a temporary site: a content directory and a
/// settings file location.
pub struct TestSite {
    #[allow(dead_code)] // Kept to prevent TempDir from being dropped
    dir: TempDir,
    pub root: PathBuf,
}

impl TestSite {
    /// Creates a new empty site with a `content/` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        // Canonicalize the path to resolve symlinks (e.g., /var -> /private/var on macOS)
        let root = dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");

        std::fs::create_dir(root.join("content")).expect("Failed to create content directory");

        Self { dir, root }
    }

    /// Directory served as content.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    /// Where the settings store lives.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Creates a content page with the given markup.
    pub fn create_page(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.content_dir().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write page");
        file_path
    }

    /// Creates a static (non-HTML) file in the content directory.
    #[allow(dead_code)]
    pub fn create_static_file(&self, path: &str, content: &[u8]) -> PathBuf {
        let file_path = self.content_dir().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write static file");
        file_path
    }

    /// Returns the path to the root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds an available port for testing.
pub fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to port");
    listener
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// Asserts that HTML content contains the expected substring.
pub fn assert_html_contains(html: &str, expected: &str) {
    assert!(
        html.contains(expected),
        "Expected HTML to contain '{}', but it wasn't found.\nHTML content:\n{}",
        expected,
        html
    );
}

/// Asserts that HTML content does not contain the unexpected substring.
pub fn assert_html_not_contains(html: &str, unexpected: &str) {
    assert!(
        !html.contains(unexpected),
        "Expected HTML to NOT contain '{}', but it was found.\nHTML content:\n{}",
        unexpected,
        html
    );
}

/// Pulls the value of the hidden nonce field out of the admin page.
#[allow(dead_code)]
pub fn extract_nonce(html: &str) -> Option<String> {
    let marker = r#"name="_nonce" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_site() {
        let site = TestSite::new();
        assert!(site.path().exists());
        assert!(site.content_dir().is_dir());
        assert!(!site.settings_file().exists());
    }

    #[test]
    fn test_create_page_in_subdir() {
        let site = TestSite::new();
        let path = site.create_page("docs/index.html", "<h1>Docs</h1>");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>Docs</h1>");
    }

    #[test]
    fn test_find_available_port() {
        let port = find_available_port();
        assert!(port > 0);

        // Verify the port is actually available
        let listener = TcpListener::bind(format!("127.0.0.1:{}", port));
        assert!(listener.is_ok());
    }

    #[test]
    fn test_extract_nonce() {
        let html = r#"<input type="hidden" name="_nonce" value="abc123">"#;
        assert_eq!(extract_nonce(html).as_deref(), Some("abc123"));
        assert_eq!(extract_nonce("<form></form>"), None);
    }

    #[test]
    #[should_panic(expected = "Expected HTML to contain")]
    fn test_assert_html_contains_fails() {
        let html = "<html><body></body></html>";
        assert_html_contains(html, "missing");
    }

    #[test]
    fn test_assert_html_not_contains() {
        let html = "<html><body></body></html>";
        assert_html_not_contains(html, "script");
    }
}
