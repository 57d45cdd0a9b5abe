//! Conversions from transport errors into the management port's error shape.
//!
//! The port speaks `anyhow::Error`. A failure that carries an HTTP status is
//! converted into a [`RestError`] so the façade passes it through; every
//! other failure keeps its own type and is coerced to a 500 further up.

use devportal_domain::RestError;
use reqwest::Error as HttpError;

use crate::http::FetchError;

/// Explicit conversion into the error type of `ManagementClient` calls.
pub trait IntoRemoteError {
    fn into_remote(self) -> anyhow::Error;
}

/* -------------------------------------------------------------------------- */
/* FetchError → anyhow::Error */
/* -------------------------------------------------------------------------- */

impl IntoRemoteError for FetchError {
    fn into_remote(self) -> anyhow::Error {
        match self {
            Self::Transient { status_code, message } | Self::Permanent { status_code, message } => {
                let message = status_message(status_code, &message);
                anyhow::Error::new(RestError::new(status_code, message))
            }
            other => anyhow::Error::new(other),
        }
    }
}

impl From<FetchError> for RestError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Transient { status_code, message }
            | FetchError::Permanent { status_code, message } => {
                RestError::new(status_code, status_message(status_code, &message))
            }
            other => RestError::internal(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → anyhow::Error */
/* -------------------------------------------------------------------------- */

impl IntoRemoteError for HttpError {
    fn into_remote(self) -> anyhow::Error {
        if let Some(status) = self.status() {
            let code = status.as_u16();
            return anyhow::Error::new(RestError::new(
                code,
                status_message(code, status.canonical_reason().unwrap_or("unknown status")),
            ));
        }

        if self.is_decode() {
            return anyhow::Error::new(self).context("failed to decode management API response");
        }

        anyhow::Error::new(self)
    }
}

fn status_message(code: u16, reason: &str) -> String {
    if reason.is_empty() {
        format!("HTTP {code}")
    } else {
        format!("HTTP {code} {reason}")
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
