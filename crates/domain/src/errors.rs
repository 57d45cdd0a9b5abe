//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code every non-status failure is coerced to.
pub const INTERNAL_STATUS_CODE: u16 = 500;

/// Status code callers special-case as "resource not found".
pub const NOT_FOUND_STATUS_CODE: u16 = 404;

/// Error returned by every management façade operation.
///
/// Only the status code is significant to callers; the message is carried
/// along for logging and diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("remote call failed with status {status_code}: {message}")]
pub struct RestError {
    pub status_code: u16,
    pub message: String,
}

/// The two cases the façade's callers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestErrorKind {
    /// The remote resource does not exist (HTTP 404).
    NotFound,
    /// Any other failure, treated as a generic internal error.
    Failure,
}

impl RestError {
    /// Error with an explicit status code.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code, message: message.into() }
    }

    /// Build a 500 error for failures that carry no status code.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_STATUS_CODE, message)
    }

    /// Build a 404 error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_STATUS_CODE, message)
    }

    /// Classify the error into the cases callers distinguish.
    #[must_use]
    pub fn kind(&self) -> RestErrorKind {
        if self.status_code == NOT_FOUND_STATUS_CODE {
            RestErrorKind::NotFound
        } else {
            RestErrorKind::Failure
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == RestErrorKind::NotFound
    }
}

/// Configuration loading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid config format: {0}")]
    Format(String),
}

/// Result type alias for façade operations
pub type Result<T> = std::result::Result<T, RestError>;
