//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_APIM_API_VERSION, DEFAULT_ARM_ENDPOINT, DEFAULT_ATTEMPT_TIMEOUT_MS,
    DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRYABLE_STATUS_CODES,
};
use crate::errors::ConfigError;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    pub management: ManagementConfig,
}

/// Keep-alive connection agent tuning.
///
/// Every field is independently optional. An absent field means "leave the
/// agent default in place", which is different from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How long an idle socket stays in the free pool (ms).
    #[serde(default)]
    pub free_socket_timeout: Option<u64>,
    /// TCP keep-alive probe interval (ms).
    #[serde(default)]
    pub keep_alive_msecs: Option<u64>,
    #[serde(default)]
    pub max_free_sockets: Option<usize>,
    #[serde(default)]
    pub max_sockets: Option<usize>,
    /// Upper bound on how long a socket may be reused (ms).
    #[serde(default)]
    pub socket_active_ttl: Option<u64>,
    /// Socket inactivity timeout (ms).
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Retry tuning for the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts (ms).
    #[serde(default = "default_initial_delay")]
    pub initial_delay: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Per-attempt timeout (ms).
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retryable_status_codes")]
    pub retryable_status_codes: Vec<u16>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_initial_delay() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}

fn default_backoff_factor() -> f64 {
    DEFAULT_BACKOFF_FACTOR
}

fn default_timeout() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_MS
}

fn default_retryable_status_codes() -> Vec<u16> {
    DEFAULT_RETRYABLE_STATUS_CODES.to_vec()
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay: default_initial_delay(),
            backoff_factor: default_backoff_factor(),
            timeout: default_timeout(),
            retryable_status_codes: default_retryable_status_codes(),
        }
    }
}

impl RetryPolicy {
    /// Check the values no deserializer can rule out.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending field when
    /// `backoff_factor` is negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "backoff_factor".into(),
                reason: format!("{} is not a finite, non-negative number", self.backoff_factor),
            });
        }
        Ok(())
    }

    /// Delay to wait once `attempts_made` attempts have failed:
    /// `initial_delay * backoff_factor ^ attempts_made`.
    #[must_use]
    pub fn delay_for(&self, attempts_made: u32) -> Duration {
        let exponent = i32::try_from(attempts_made).unwrap_or(i32::MAX);
        let millis = self.initial_delay as f64 * self.backoff_factor.powi(exponent);
        if millis.is_finite() && millis > 0.0 {
            Duration::from_millis(millis.min(u64::MAX as f64) as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Per-attempt timeout as a `Duration`.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Whether a response with `status` may be retried.
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }
}

/// Scope of the remote API Management instance the façade talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementConfig {
    pub azure_subscription_id: String,
    pub resource_group: String,
    pub service_name: String,
    #[serde(default = "default_arm_endpoint")]
    pub arm_endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_arm_endpoint() -> String {
    DEFAULT_ARM_ENDPOINT.to_string()
}

fn default_api_version() -> String {
    DEFAULT_APIM_API_VERSION.to_string()
}

impl ManagementConfig {
    /// Scope with the default ARM endpoint and API version.
    #[must_use]
    pub fn new(
        azure_subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            azure_subscription_id: azure_subscription_id.into(),
            resource_group: resource_group.into(),
            service_name: service_name.into(),
            arm_endpoint: default_arm_endpoint(),
            api_version: default_api_version(),
        }
    }
}
