//! URL sanitization applied before a URL is stored.
//!
//! Mirrors what a CMS does to a URL setting on save: whitespace and
//! characters that cannot appear in a URL are dropped, a bare host gets an
//! `http://` scheme, and anything that is not http(s) is refused.

use url::Url;

use crate::errors::SanitizeError;

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || !c.is_ascii() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}

/// Clean up `raw` for storage.
///
/// An empty (or whitespace-only) input is valid and clears the setting.
/// The returned string is the cleaned input, not a re-serialized [`Url`],
/// so an accepted value reads back the way it was typed.
pub fn sanitize_url(raw: &str) -> Result<String, SanitizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let mut cleaned: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| !c.is_control() && is_url_char(*c))
        .collect();

    if cleaned.is_empty() || cleaned.starts_with(['/', '#', '?']) {
        return Err(SanitizeError::NotAUrl {
            input: trimmed.to_string(),
        });
    }

    if !cleaned.contains(':') {
        cleaned.insert_str(0, "http://");
    }

    let parsed = Url::parse(&cleaned).map_err(|_| SanitizeError::NotAUrl {
        input: trimmed.to_string(),
    })?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        tracing::warn!("refusing url with scheme {}", parsed.scheme());
        return Err(SanitizeError::DisallowedScheme {
            scheme: parsed.scheme().to_string(),
        });
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(SanitizeError::NotAUrl {
            input: trimmed.to_string(),
        });
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clears() {
        assert_eq!(sanitize_url(""), Ok(String::new()));
        assert_eq!(sanitize_url("   "), Ok(String::new()));
    }

    #[test]
    fn test_plain_url_unchanged() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10";
        assert_eq!(sanitize_url(url).as_deref(), Ok(url));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(
            sanitize_url("  https://youtu.be/dQw4w9WgXcQ\n").as_deref(),
            Ok("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_strips_invalid_characters() {
        assert_eq!(
            sanitize_url(r#"https://youtu.be/dQw4w9WgXcQ"><script>"#).as_deref(),
            Ok("https://youtu.be/dQw4w9WgXcQscript")
        );
        assert_eq!(
            sanitize_url("https://youtu.be/dQw4w\u{0}9WgXcQ").as_deref(),
            Ok("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_interior_space_is_encoded() {
        assert_eq!(
            sanitize_url("https://example.com/a b").as_deref(),
            Ok("https://example.com/a%20b")
        );
    }

    #[test]
    fn test_bare_host_gets_http() {
        assert_eq!(
            sanitize_url("youtu.be/dQw4w9WgXcQ").as_deref(),
            Ok("http://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(
            sanitize_url("javascript:alert(1)"),
            Err(SanitizeError::DisallowedScheme {
                scheme: "javascript".to_string()
            })
        );
        assert!(matches!(
            sanitize_url("ftp://example.com/video"),
            Err(SanitizeError::DisallowedScheme { .. })
        ));
        assert!(matches!(
            sanitize_url("data:text/html,hi"),
            Err(SanitizeError::DisallowedScheme { .. })
        ));
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            sanitize_url("/watch?v=dQw4w9WgXcQ"),
            Err(SanitizeError::NotAUrl { .. })
        ));
        assert!(matches!(
            sanitize_url("<>"),
            Err(SanitizeError::NotAUrl { .. })
        ));
    }

    #[test]
    fn test_output_has_no_markup_characters() {
        let out = sanitize_url(r#"https://example.com/"<b>&x"#).unwrap();
        assert!(!out.contains(['<', '>', '"']));
        assert!(out.contains('&'));
    }
}
