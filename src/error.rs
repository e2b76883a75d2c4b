// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
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

    /// Regular expression compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Navigation, selector wait or extraction failed for one unit of work
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// A renderer operation exceeded its time budget
    #[error("Timed out after {millis}ms: {context}")]
    Timeout { context: String, millis: u64 },

    /// A cached URL file could not be read or parsed
    #[error("Corrupt cache entry {path}: {message}")]
    CorruptCache { path: String, message: String },

    /// A result store file could not be read or parsed
    #[error("Corrupt result store {path}: {message}")]
    CorruptStore { path: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error with context.
    pub fn timeout(context: impl Into<String>, millis: u64) -> Self {
        Self::Timeout {
            context: context.into(),
            millis,
        }
    }

    /// Create a corrupt cache error for the given file.
    pub fn corrupt_cache(path: &Path, message: impl fmt::Display) -> Self {
        Self::CorruptCache {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a corrupt store error for the given file.
    pub fn corrupt_store(path: &Path, message: impl fmt::Display) -> Self {
        Self::CorruptStore {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error only affects a single unit of work and may be
    /// downgraded to "no result".
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Timeout { .. } | Self::Http(_))
    }
}
