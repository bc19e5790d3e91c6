//! Placement shortcode expansion.
//!
//! Content authors drop `[asamblea_live]` into a page and it is replaced by
//! whatever the expansion callback returns. Attributes inside the brackets
//! are tolerated and ignored. A doubled token `[[asamblea_live]]` is an
//! escape and comes out as the literal single-bracket token.

use regex::{Captures, Regex};

/// Tag used when configuration does not name one.
pub const DEFAULT_TAG: &str = "asamblea_live";

#[derive(Debug, Clone)]
pub struct Shortcode {
    tag: String,
    pattern: Regex,
}

impl Shortcode {
    /// Build a matcher for `tag`. Callers validate the tag
    /// (see `Config::validate`); it is regex-escaped regardless.
    pub fn new(tag: &str) -> Result<Self, regex::Error> {
        // group 1/3: optional extra brackets, group 2: the token itself
        let pattern = Regex::new(&format!(
            r"(\[?)(\[{}(?:\s[^\[\]]*?)?\s*/?\])(\]?)",
            regex::escape(tag)
        ))?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    /// The token an author types, e.g. `[asamblea_live]`.
    pub fn token(&self) -> String {
        format!("[{}]", self.tag)
    }

    /// Replace every occurrence of the shortcode in `content`.
    ///
    /// `render` is called once per occurrence, so each placement reads the
    /// current configuration.
    pub fn expand<F>(&self, content: &str, mut render: F) -> String
    where
        F: FnMut() -> String,
    {
        self.pattern
            .replace_all(content, |caps: &Captures| {
                let open = &caps[1];
                let close = &caps[3];
                if !open.is_empty() && !close.is_empty() {
                    caps[2].to_string()
                } else {
                    format!("{open}{}{close}", render())
                }
            })
            .into_owned()
    }
}

impl Default for Shortcode {
    fn default() -> Self {
        Self::new(DEFAULT_TAG).expect("default shortcode tag is a valid pattern")
    }
}
