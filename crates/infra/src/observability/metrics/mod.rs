//! Metrics collection modules

pub mod transport;

pub use transport::TransportMetrics;
