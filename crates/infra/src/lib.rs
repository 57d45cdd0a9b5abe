//! # Devportal Infrastructure
//!
//! Network-facing implementations behind the devportal core ports.
//!
//! This crate contains:
//! - The keep-alive agent pool and the retrying HTTP transport
//! - A REST implementation of `ManagementClient` for Azure API Management
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `devportal-core`
//! - Depends on `devportal-domain` and `devportal-core`
//! - Contains all "impure" code (sockets, timers, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod management;
pub mod observability;

// Re-export commonly used items
pub use errors::IntoRemoteError;
pub use http::*;
pub use management::{
    connect, connect_with_transport, AccessTokenProvider, RestManagementClient, StaticTokenProvider,
};
pub use observability::{init_logging, LogFormat};
