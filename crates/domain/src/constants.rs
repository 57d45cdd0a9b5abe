//! Application constants
//!
//! Centralized location for the defaults of transport tuning and the remote
//! management endpoint.

// Retry policy defaults

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base backoff delay in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;
/// Backoff multiplier; `1.0` keeps the delay constant.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.0;
/// Per-attempt timeout in milliseconds.
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 10_000;
/// Statuses retried unless the policy overrides them.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

// Management endpoint defaults

/// Azure Resource Manager base URL.
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
/// `api-version` sent with every management call.
pub const DEFAULT_APIM_API_VERSION: &str = "2022-08-01";

/// Subscriptions whose name starts with this prefix are used to manage the
/// owner's account and are hidden from regular listings.
pub const MANAGE_SUBSCRIPTION_PREFIX: &str = "MANAGE-";
