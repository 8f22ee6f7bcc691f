// src/error.rs

//! Unified error handling for the tracker.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// A failed probe of a single combination is never represented here; it
/// collapses into [`crate::models::Liveness::Absent`] instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Persisted seen-set exists but cannot be decoded
    #[error("Corrupt seen-set file {path}: {message}")]
    DataCorruption { path: String, message: String },

    /// Category list could not be fetched
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Report document could not be produced
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error (including missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mail relay rejected the credentials
    #[error("Mail authentication failed: {0}")]
    Auth(String),

    /// Mail could not be delivered
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Remote storage authorization or transfer failed
    #[error("Upload error: {0}")]
    Upload(String),
}

impl AppError {
    /// Create a data corruption error for a persisted file.
    pub fn corruption(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DataCorruption {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error with the offending URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a render error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a mail authentication error.
    pub fn auth(message: impl fmt::Display) -> Self {
        Self::Auth(message.to_string())
    }

    /// Create a mail transport error.
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// Create an upload error.
    pub fn upload(message: impl fmt::Display) -> Self {
        Self::Upload(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::fetch("https://example.com/categories", "status 500");
        assert_eq!(
            err.to_string(),
            "Fetch error for https://example.com/categories: status 500"
        );

        let err = AppError::corruption("seen.json", "expected array");
        assert!(err.to_string().contains("seen.json"));
    }
}
