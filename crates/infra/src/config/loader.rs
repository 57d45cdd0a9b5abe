//! Configuration loader
//!
//! Loads the transport tuning and management scope from environment
//! variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If a required variable is missing, falls back to loading from file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Keep-alive agent (all optional, milliseconds unless noted):
//! - `FETCH_KEEPALIVE_FREE_SOCKET_TIMEOUT`
//! - `FETCH_KEEPALIVE_KEEPALIVE_MSECS`
//! - `FETCH_KEEPALIVE_MAX_FREE_SOCKETS` (count)
//! - `FETCH_KEEPALIVE_MAX_SOCKETS` (count)
//! - `FETCH_KEEPALIVE_SOCKET_ACTIVE_TTL`
//! - `FETCH_KEEPALIVE_TIMEOUT`
//!
//! Retry policy (all optional, defaults from `RetryPolicy::default`):
//! - `FETCH_RETRY_MAX_RETRIES`
//! - `FETCH_RETRY_INITIAL_DELAY`
//! - `FETCH_RETRY_BACKOFF_FACTOR`
//! - `FETCH_RETRY_TIMEOUT`
//! - `FETCH_RETRY_RETRYABLE_STATUS_CODES` (comma separated)
//!
//! Management scope:
//! - `AZURE_SUBSCRIPTION_ID`, `AZURE_APIM_RESOURCE_GROUP`, `AZURE_APIM`
//!   (required)
//! - `ARM_ENDPOINT`, `AZURE_APIM_API_VERSION` (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./devportal.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use devportal_domain::{AgentConfig, Config, ConfigError, ManagementConfig, RetryPolicy};

type Result<T> = std::result::Result<T, ConfigError>;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If any required variable is missing, falls back to a config file.
///
/// # Errors
/// Returns the environment error when a variable is present but malformed,
/// otherwise the file loading error.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::MissingVar(name)) => {
            tracing::debug!(missing = %name, "Environment incomplete, trying file");
            load_from_file(None)
        }
        Err(err) => Err(err),
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ConfigError::MissingVar` if a required variable is missing and
/// `ConfigError::InvalidValue` if a variable cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let agent = AgentConfig {
        free_socket_timeout: env_parse("FETCH_KEEPALIVE_FREE_SOCKET_TIMEOUT")?,
        keep_alive_msecs: env_parse("FETCH_KEEPALIVE_KEEPALIVE_MSECS")?,
        max_free_sockets: env_parse("FETCH_KEEPALIVE_MAX_FREE_SOCKETS")?,
        max_sockets: env_parse("FETCH_KEEPALIVE_MAX_SOCKETS")?,
        socket_active_ttl: env_parse("FETCH_KEEPALIVE_SOCKET_ACTIVE_TTL")?,
        timeout: env_parse("FETCH_KEEPALIVE_TIMEOUT")?,
    };

    let mut retry = RetryPolicy::default();
    if let Some(max_retries) = env_parse("FETCH_RETRY_MAX_RETRIES")? {
        retry.max_retries = max_retries;
    }
    if let Some(initial_delay) = env_parse("FETCH_RETRY_INITIAL_DELAY")? {
        retry.initial_delay = initial_delay;
    }
    if let Some(backoff_factor) = env_parse("FETCH_RETRY_BACKOFF_FACTOR")? {
        retry.backoff_factor = backoff_factor;
    }
    if let Some(timeout) = env_parse("FETCH_RETRY_TIMEOUT")? {
        retry.timeout = timeout;
    }
    if let Some(codes) = env_status_codes("FETCH_RETRY_RETRYABLE_STATUS_CODES")? {
        retry.retryable_status_codes = codes;
    }
    retry.validate().map_err(|err| match err {
        ConfigError::InvalidValue { name, reason } => ConfigError::InvalidValue {
            name: format!("FETCH_RETRY_{}", name.to_uppercase()),
            reason,
        },
        other => other,
    })?;

    let mut management = ManagementConfig::new(
        env_var("AZURE_SUBSCRIPTION_ID")?,
        env_var("AZURE_APIM_RESOURCE_GROUP")?,
        env_var("AZURE_APIM")?,
    );
    if let Some(endpoint) = env_opt("ARM_ENDPOINT") {
        management.arm_endpoint = endpoint;
    }
    if let Some(api_version) = env_opt("AZURE_APIM_API_VERSION") {
        management.api_version = api_version;
    }

    Ok(Config { agent, retry, management })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConfigError::FileNotFound` if no file exists and
/// `ConfigError::Format` if it cannot be read or parsed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::FileNotFound(p.display().to_string()));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::FileNotFound("no config file in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::Format(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, detecting the format from the file extension.
///
/// The retry policy is validated after parsing, the same way
/// [`load_from_env`] validates it.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("Invalid JSON format: {e}")))?,
        _ => return Err(ConfigError::Format(format!("Unsupported config format: {extension}"))),
    };

    config.retry.validate().map_err(|err| match err {
        ConfigError::InvalidValue { name, reason } => {
            ConfigError::InvalidValue { name: format!("retry.{name}"), reason }
        }
        other => other,
    })?;

    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "config.json",
        "config.toml",
        "devportal.json",
        "devportal.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

/// Optional variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name: key.to_string(),
                reason: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

fn env_status_codes(key: &str) -> Result<Option<Vec<u16>>> {
    env_opt(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(|code| {
                    code.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        name: key.to_string(),
                        reason: format!("{code:?}: {e}"),
                    })
                })
                .collect()
        })
        .transpose()
}
