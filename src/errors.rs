//! Centralized error types for asamblea-live.
//!
//! Rendering never fails; these cover the host around it (configuration,
//! storage, templates, the HTTP server) and input rejected on write.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),

    #[error("Rejected URL: {0}")]
    Sanitize(#[from] SanitizeError),
}

/// Errors related to the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server failed to start")]
    StartFailed(#[source] std::io::Error),

    #[error("Failed to get local address")]
    LocalAddrFailed(#[source] std::io::Error),

    #[error("Template initialization failed: {0}")]
    TemplateInit(#[from] TemplateError),
}

/// Errors related to configuration loading and parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration parsing failed")]
    ParseFailed(Box<figment::Error>),

    #[error("Template folder is not a directory: {}", path.display())]
    TemplateFolderNotDirectory { path: PathBuf },

    #[error(
        "Invalid host address: {host}. Must be a valid IPv4 address (e.g., 127.0.0.1 or 0.0.0.0)"
    )]
    InvalidHost { host: String },

    #[error("Invalid port: {port}. Port must be between 1 and 65535")]
    InvalidPort { port: u16 },

    #[error("Invalid shortcode tag: {tag:?}. Use letters, digits, '_' or '-'")]
    InvalidShortcodeTag { tag: String },

    #[error("Invalid debug parameter name: {name:?}")]
    InvalidDebugParam { name: String },

    #[error("admin_token must not be blank when set")]
    BlankAdminToken,
}

/// Errors related to reading and writing persisted settings.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read settings file: {}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings file: {}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file is not valid JSON: {}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings")]
    SerializeFailed(#[from] serde_json::Error),
}

/// Reasons a submitted URL is refused before it reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Only http and https URLs are allowed, got scheme {scheme:?}")]
    DisallowedScheme { scheme: String },

    #[error("Not a valid URL: {input:?}")]
    NotAUrl { input: String },
}

/// Errors related to template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to initialize templates from: {}", path.display())]
    InitFailed {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render template: {template_name}")]
    RenderFailed {
        template_name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("Invalid path encoding")]
    InvalidPathEncoding,
}
