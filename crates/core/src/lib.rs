//! # Devportal Core
//!
//! Pure client-side logic over the remote API Management service - no
//! network code.
//!
//! This crate contains:
//! - The filter-expression builder used to compose `$filter` queries
//! - The `ManagementClient` port through which the remote service is reached
//! - `ManagementService`, the typed façade mapping every failure to
//!   `RestError`
//!
//! ## Architecture Principles
//! - Only depends on `devportal-domain`
//! - All remote access goes through the `ManagementClient` trait
//! - The façade never retries; retrying belongs to the transport underneath

pub mod filter;
pub mod ports;
pub mod service;

pub use filter::{
    build_filter, exclude_prefix_filter, ids_filter, join_filters, Composition, Field,
    FilterExpression, Function, Operator, Predicate,
};
pub use ports::{ListOptions, ManagementClient, PageStream, ServiceScope};
pub use service::{to_rest_error, ManagementService};
