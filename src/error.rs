// src/error.rs

//! Unified error handling for the departure board.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (transport level)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a status other than the expected one
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mandatory elements never appeared within the wait window
    #[error("Timed out after {waited:?} waiting for '{locator}'")]
    Timeout { locator: String, waited: Duration },

    /// Document failed to load
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Element found but its content is unusable
    #[error("Structural mismatch in '{locator}': {message}")]
    StructuralMismatch { locator: String, message: String },
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

    /// Create a timeout error for a locator.
    pub fn timeout(locator: impl Into<String>, waited: Duration) -> Self {
        Self::Timeout {
            locator: locator.into(),
            waited,
        }
    }

    /// Create a navigation error.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a structural mismatch error.
    pub fn structural(locator: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StructuralMismatch {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error belongs to a single poll cycle.
    ///
    /// Cycle errors are logged and retried on the next cycle; everything
    /// else can only happen at startup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::Json(_)
                | Self::Timeout { .. }
                | Self::Navigation { .. }
                | Self::StructuralMismatch { .. }
        )
    }
}
