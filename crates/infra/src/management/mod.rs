//! Azure API Management REST client
//!
//! [`RestManagementClient`] implements the core `ManagementClient` port over
//! the retrying transport; [`connect`] wires it into the façade.

pub mod auth;
pub mod client;
mod wire;

use std::sync::Arc;

use devportal_core::ManagementService;
use devportal_domain::{Config, ConfigError};
use tracing::info;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::RestManagementClient;

use crate::http::RetryingTransport;

/// Build the management façade from configuration.
///
/// # Errors
///
/// Returns `ConfigError` if the management endpoint is invalid.
pub fn connect(
    config: &Config,
    auth: Arc<dyn AccessTokenProvider>,
) -> Result<ManagementService, ConfigError> {
    let transport = RetryingTransport::new(&config.agent, config.retry.clone());
    connect_with_transport(config, transport, auth)
}

/// Like [`connect`], with a caller-built transport (e.g. one carrying
/// metrics).
///
/// # Errors
///
/// Returns `ConfigError` if the management endpoint is invalid.
pub fn connect_with_transport(
    config: &Config,
    transport: RetryingTransport,
    auth: Arc<dyn AccessTokenProvider>,
) -> Result<ManagementService, ConfigError> {
    let management = &config.management;
    let client = RestManagementClient::new(management, transport, auth)?;

    info!(
        endpoint = %management.arm_endpoint,
        resource_group = %management.resource_group,
        service = %management.service_name,
        "management client configured"
    );

    Ok(ManagementService::new(
        Arc::new(client),
        management.resource_group.clone(),
        management.service_name.clone(),
    ))
}
