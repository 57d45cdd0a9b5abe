//! # Devportal Domain
//!
//! Value types shared by the API Management client layer.
//!
//! This crate contains:
//! - Transport tuning (`AgentConfig`, `RetryPolicy`) and management scope
//!   configuration
//! - Remote resource types (users, groups, subscriptions, products, keys)
//! - The façade error type `RestError` and its two-case classification
//!
//! ## Architecture
//! - No dependencies on other devportal crates
//! - No I/O, only data structures and their invariants

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
