//! Transport error taxonomy

use std::time::Duration;

use thiserror::Error;

/// Failure of a logical fetch.
///
/// `Transient` and `Permanent` come from a response status. `Network` and
/// `Timeout` are raw attempt failures: they are retried like `Transient`
/// but surface as themselves once the budget is spent. `Cancelled` and
/// `InvalidRequest` end the call without further attempts.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transient HTTP failure {status_code}: {message}")]
    Transient { status_code: u16, message: String },

    #[error("permanent HTTP failure {status_code}: {message}")]
    Permanent { status_code: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP attempt aborted after {after:?}")]
    Timeout { after: Duration },

    #[error("HTTP request cancelled")]
    Cancelled,

    #[error("HTTP request could not be prepared: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Whether another attempt may be made after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transient { .. } | Self::Network(_) | Self::Timeout { .. } => true,
            Self::Permanent { .. } | Self::Cancelled | Self::InvalidRequest(_) => false,
        }
    }

    /// Response status behind the failure, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transient { status_code, .. } | Self::Permanent { status_code, .. } => {
                Some(*status_code)
            }
            Self::Network(err) => err.status().map(|status| status.as_u16()),
            Self::Timeout { .. } | Self::Cancelled | Self::InvalidRequest(_) => None,
        }
    }
}
