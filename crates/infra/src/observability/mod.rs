//! Observability infrastructure for logging and transport metrics
//!
//! ## Error Handling
//!
//! Recording never fails. Only derived readings (averages) return
//! [`MetricsResult`], with [`MetricsError::EmptyData`] when nothing has been
//! recorded yet.
//!
//! ```rust
//! use devportal_infra::observability::metrics::TransportMetrics;
//!
//! let metrics = TransportMetrics::new();
//! if let Err(e) = metrics.get_avg_attempt_time_ms() {
//!     tracing::debug!("no attempts yet: {}", e);
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average attempt time")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
