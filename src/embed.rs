//! YouTube URL normalization.
//!
//! Maps an administrator-supplied URL onto a canonical embeddable player URL.
//! Nothing here fails: an empty or unrecognized URL is reported through
//! [`EmbedResult`] and the caller decides what to show.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix of every player URL built from a bare video ID.
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

const EMBED_MARKER: &str = "youtube.com/embed/";
const LIVE_MARKER: &str = "youtube.com/live/";

/// Length of a YouTube video ID.
pub const VIDEO_ID_LEN: usize = 11;

// Tried in order; the first capture wins.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{11})")
            .expect("Invalid watch/short/embed regex pattern"),
        Regex::new(r"youtube\.com/live/([A-Za-z0-9_-]{11})").expect("Invalid live regex pattern"),
        Regex::new(r"youtube\.com/watch\?.*v=([A-Za-z0-9_-]{11})")
            .expect("Invalid watch query regex pattern"),
    ]
});

/// Outcome of normalizing a configured URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedResult {
    /// Nothing configured (empty or whitespace-only input).
    Empty,
    /// A URL suitable for an `<iframe src>`, before playback parameters are added.
    Embeddable(String),
    /// None of the known YouTube shapes matched; carries the input unchanged.
    Unparseable(String),
}

/// Normalize a raw (already sanitized) URL.
///
/// Order matters: literal embed URLs pass through untouched, live URLs get a
/// single substring rewrite, and only then is a video ID extracted.
pub fn normalize(raw_url: &str) -> EmbedResult {
    if raw_url.trim().is_empty() {
        return EmbedResult::Empty;
    }

    if raw_url.contains(EMBED_MARKER) {
        tracing::debug!("embed url passed through: {raw_url}");
        return EmbedResult::Embeddable(raw_url.to_string());
    }

    if raw_url.contains(LIVE_MARKER) {
        let rewritten = raw_url.replace(LIVE_MARKER, EMBED_MARKER);
        tracing::debug!("live url rewritten to {rewritten}");
        return EmbedResult::Embeddable(rewritten);
    }

    match extract_video_id(raw_url) {
        Some(id) => EmbedResult::Embeddable(format!("{EMBED_BASE}{id}")),
        None => {
            tracing::debug!("no youtube video id found in {raw_url}");
            EmbedResult::Unparseable(raw_url.to_string())
        }
    }
}

/// Extract the 11-character video ID from any recognized YouTube URL shape.
pub fn extract_video_id(raw_url: &str) -> Option<&str> {
    if raw_url.is_empty() {
        return None;
    }
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(raw_url).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
        .filter(|id| id.len() == VIDEO_ID_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn embeddable(url: &str) -> String {
        match normalize(url) {
            EmbedResult::Embeddable(u) => u,
            other => panic!("expected Embeddable for {url}, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), EmbedResult::Empty);
        assert_eq!(normalize(" "), EmbedResult::Empty);
        assert_eq!(normalize("\t\n "), EmbedResult::Empty);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            embeddable("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            embeddable("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_url_with_timestamp() {
        assert_eq!(
            embeddable("https://youtu.be/dQw4w9WgXcQ?t=42"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_watch_url_with_v_not_first() {
        assert_eq!(
            embeddable("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_embed_url_passes_through_verbatim() {
        let url = "https://www.youtube.com/embed/dQw4w9WgXcQ?start=30";
        assert_eq!(embeddable(url), url);
    }

    #[test]
    fn test_embed_url_is_idempotent() {
        let once = embeddable("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(embeddable(&once), once);
    }

    #[test]
    fn test_live_url_rewritten() {
        assert_eq!(
            embeddable("https://www.youtube.com/live/abcDEF12345?si=xyz"),
            "https://www.youtube.com/embed/abcDEF12345?si=xyz"
        );
    }

    #[test]
    fn test_live_rewrite_replaces_every_occurrence() {
        let url = "https://www.youtube.com/live/abcDEF12345?next=youtube.com/live/x";
        assert_eq!(
            embeddable(url),
            "https://www.youtube.com/embed/abcDEF12345?next=youtube.com/embed/x"
        );
    }

    #[test]
    fn test_recognized_shapes_carry_the_id() {
        for url in [
            format!("https://www.youtube.com/watch?v={ID}"),
            format!("https://youtu.be/{ID}"),
            format!("https://www.youtube.com/embed/{ID}"),
            format!("https://www.youtube.com/live/{ID}"),
        ] {
            let out = embeddable(&url);
            assert!(out.contains(&format!("embed/{ID}")), "{url} -> {out}");
        }
    }

    #[test]
    fn test_not_youtube_is_unparseable() {
        assert_eq!(
            normalize("https://example.com/not-youtube"),
            EmbedResult::Unparseable("https://example.com/not-youtube".to_string())
        );
    }

    #[test]
    fn test_short_id_is_unparseable() {
        assert!(matches!(
            normalize("https://youtu.be/abc"),
            EmbedResult::Unparseable(_)
        ));
        assert!(matches!(
            normalize("https://www.youtube.com/watch?v=tooShort"),
            EmbedResult::Unparseable(_)
        ));
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some(ID));
        assert_eq!(
            extract_video_id("https://www.youtube.com/live/abcDEF12345"),
            Some("abcDEF12345")
        );
        assert_eq!(extract_video_id("https://vimeo.com/12345678901"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_extract_video_id_truncates_longer_ids() {
        // Only the first 11 characters are part of the ID.
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQextra"),
            Some(ID)
        );
    }
}
