//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use devportal_domain::{AgentConfig, ConfigError};
use devportal_infra::config;
use tempfile::NamedTempFile;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        ".json",
        r#"{
            "agent": {
                "free_socket_timeout": 30000,
                "keep_alive_msecs": 1000,
                "max_sockets": 50
            },
            "retry": {
                "max_retries": 4,
                "initial_delay": 250,
                "backoff_factor": 2.0,
                "timeout": 5000,
                "retryable_status_codes": [429, 503]
            },
            "management": {
                "azure_subscription_id": "sub-1",
                "resource_group": "rg-portal",
                "service_name": "apim-portal",
                "arm_endpoint": "https://management.example.test",
                "api_version": "2021-08-01"
            }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.agent.free_socket_timeout, Some(30_000));
    assert_eq!(config.agent.keep_alive_msecs, Some(1_000));
    assert_eq!(config.agent.max_sockets, Some(50));
    assert_eq!(config.agent.timeout, None);

    assert_eq!(config.retry.max_retries, 4);
    assert_eq!(config.retry.initial_delay, 250);
    assert!((config.retry.backoff_factor - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.retry.timeout, 5_000);
    assert_eq!(config.retry.retryable_status_codes, vec![429, 503]);

    assert_eq!(config.management.azure_subscription_id, "sub-1");
    assert_eq!(config.management.arm_endpoint, "https://management.example.test");
    assert_eq!(config.management.api_version, "2021-08-01");
}

#[test]
fn test_load_config_with_minimal_fields() {
    let file = config_file(
        ".toml",
        r#"
[management]
azure_subscription_id = "sub-1"
resource_group = "rg-portal"
service_name = "apim-portal"
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config with minimal fields");

    assert_eq!(config.agent, AgentConfig::default());
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.initial_delay, 1_000);
    assert_eq!(config.retry.timeout, 10_000);
    assert_eq!(config.retry.retryable_status_codes, vec![408, 429, 500, 502, 503, 504]);
    assert_eq!(config.management.arm_endpoint, "https://management.azure.com");
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/config.json".into()));

    match result {
        Err(ConfigError::FileNotFound(path)) => assert!(path.contains("config.json")),
        other => panic!("Expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let file = config_file(".json", r#"{ "this is": "not valid" "#);

    match config::load_from_file(Some(file.path().to_path_buf())) {
        Err(ConfigError::Format(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Format error, got {other:?}"),
    }
}

#[test]
fn test_load_config_rejects_negative_backoff_factor() {
    let file = config_file(
        ".toml",
        r#"
[retry]
initial_delay = 100
backoff_factor = -2.0

[management]
azure_subscription_id = "sub-1"
resource_group = "rg-portal"
service_name = "apim-portal"
"#,
    );

    match config::load_from_file(Some(file.path().to_path_buf())) {
        Err(ConfigError::InvalidValue { name, .. }) => assert_eq!(name, "retry.backoff_factor"),
        other => panic!("Expected InvalidValue, got {other:?}"),
    }
}
