//! Player markup for the configured YouTube URL.
//!
//! [`Renderer::render`] is total: every input produces a displayable
//! fragment, either a placeholder or the embedded player.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::embed::{self, EmbedResult};
use crate::i18n::{Locale, Messages};

/// Query parameters appended to every player URL.
pub const PLAYBACK_PARAMS: &str = "autoplay=0&rel=0&modestbranding=1";

const FRAME_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

/// What to do with a configured URL that matches no YouTube shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparseablePolicy {
    /// Show an error placeholder naming the offending URL.
    #[default]
    Error,
    /// Use the raw URL as the frame source anyway.
    Passthrough,
}

/// The three terminal states of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    NotConfigured,
    Invalid { raw_url: String },
    Playable { embed_url: String },
}

#[derive(Debug, Clone)]
pub struct Renderer {
    policy: UnparseablePolicy,
    messages: &'static Messages,
    player_title: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Locale::default(), UnparseablePolicy::default())
    }
}

impl Renderer {
    pub fn new(locale: Locale, policy: UnparseablePolicy) -> Self {
        Self {
            policy,
            messages: locale.messages(),
            player_title: None,
        }
    }

    /// Override the localized frame title.
    pub fn with_player_title(mut self, title: Option<String>) -> Self {
        self.player_title = title.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    /// Decide which state a configured URL renders as. The playable URL
    /// already carries the playback parameters.
    pub fn classify(&self, configured_url: &str) -> RenderState {
        match embed::normalize(configured_url) {
            EmbedResult::Empty => RenderState::NotConfigured,
            EmbedResult::Embeddable(url) => RenderState::Playable {
                embed_url: with_playback_params(&url),
            },
            EmbedResult::Unparseable(raw_url) => match self.policy {
                UnparseablePolicy::Error => RenderState::Invalid { raw_url },
                UnparseablePolicy::Passthrough => {
                    tracing::debug!("passing unrecognized url through as frame source");
                    RenderState::Playable {
                        embed_url: with_playback_params(&raw_url),
                    }
                }
            },
        }
    }

    /// Render the fragment for `configured_url`.
    ///
    /// The diagnostic block is only included when the viewer is privileged
    /// *and* asked for it.
    pub fn render(&self, configured_url: &str, privileged: bool, debug: bool) -> String {
        match self.classify(configured_url) {
            RenderState::NotConfigured => self.not_configured_html(),
            RenderState::Invalid { raw_url } => self.invalid_html(&raw_url),
            RenderState::Playable { embed_url } => {
                let mut html = String::new();
                if privileged && debug {
                    html.push_str(&self.debug_html(configured_url, &embed_url));
                }
                html.push_str(&self.player_html(&embed_url));
                html
            }
        }
    }

    fn title(&self) -> &str {
        self.player_title
            .as_deref()
            .unwrap_or(self.messages.player_title)
    }

    fn not_configured_html(&self) -> String {
        format!(
            r#"<div class="asamblea-container">
    <div class="asamblea-no-url">
        <p>{}</p>
        <p><small>{}</small></p>
    </div>
</div>"#,
            escape(self.messages.not_configured),
            escape(self.messages.settings_hint),
        )
    }

    fn invalid_html(&self, raw_url: &str) -> String {
        format!(
            r#"<div class="asamblea-container">
    <div class="asamblea-no-url asamblea-error">
        <p>{}</p>
        <p><small>{}</small></p>
        <p><small>{}: {}</small></p>
    </div>
</div>"#,
            escape(self.messages.invalid_url),
            escape(self.messages.settings_hint),
            escape(self.messages.configured_url_label),
            escape(raw_url),
        )
    }

    fn debug_html(&self, configured_url: &str, embed_url: &str) -> String {
        let video_id = embed::extract_video_id(configured_url).unwrap_or("");
        format!(
            r#"<div class="asamblea-debug">
    <strong>{}:</strong><br>
    {}: {}<br>
    {}: {}<br>
    {}: {}
</div>
"#,
            escape(self.messages.debug_heading),
            escape(self.messages.debug_original_url),
            escape(configured_url),
            escape(self.messages.debug_video_id),
            escape(video_id),
            escape(self.messages.debug_embed_url),
            escape(embed_url),
        )
    }

    fn player_html(&self, embed_url: &str) -> String {
        format!(
            r#"<div class="asamblea-container">
    <div class="asamblea-video-section">
        <div class="asamblea-video-wrapper" style="position: relative; width: 100%; padding-bottom: 56.25%; height: 0; overflow: hidden;">
            <iframe
                src="{}"
                title="{}"
                allow="{}"
                allowfullscreen
                loading="lazy"
                referrerpolicy="strict-origin-when-cross-origin"
                style="position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: none;"
            ></iframe>
        </div>
    </div>
</div>"#,
            escape_src(embed_url),
            escape(self.title()),
            FRAME_ALLOW,
        )
    }
}

/// Append [`PLAYBACK_PARAMS`] unless the URL already carries them.
pub fn with_playback_params(url: &str) -> String {
    if url.contains(PLAYBACK_PARAMS) {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{PLAYBACK_PARAMS}")
}

fn escape(s: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(s)
}

// The playback parameters and their separator are ours and go in literally;
// everything in front of them came from configuration and gets escaped.
fn escape_src(embed_url: &str) -> String {
    let split = embed_url
        .strip_suffix(PLAYBACK_PARAMS)
        .and_then(|base| {
            let separator = base.chars().last().filter(|c| matches!(c, '?' | '&'))?;
            Some((&base[..base.len() - 1], separator))
        });
    match split {
        Some((base, separator)) => format!("{}{separator}{PLAYBACK_PARAMS}", escape(base)),
        None => escape(embed_url).into_owned(),
    }
}
