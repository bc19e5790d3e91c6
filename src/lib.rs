//! asamblea-live
//!
//! Embeds one administrator-configured YouTube stream wherever a content page
//! places the `[asamblea_live]` shortcode.

pub mod cli;
pub mod config;
pub mod embed;
pub mod errors;
pub mod i18n;
pub mod nonce;
pub mod render;
pub mod sanitize;
pub mod server;
pub mod shortcode;
pub mod store;
pub mod templates;

pub use config::Config;
pub use embed::{EmbedResult, normalize};
pub use errors::{AppError, ConfigError, SanitizeError, ServerError, StoreError, TemplateError};
pub use render::{RenderState, Renderer, UnparseablePolicy};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
