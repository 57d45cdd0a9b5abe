//! Transport metrics for the retrying HTTP fetch loop
//!
//! Counts attempts and their outcomes across every logical fetch that shares
//! one [`TransportMetrics`] instance.
//!
//! ## Design
//! - **SeqCst ordering** for the atomics behind derived metrics
//!   (avg_attempt_time)
//! - **Relaxed ordering** for independent outcome counters
//! - **Microsecond storage** - raw durations in µs, reporting helpers convert
//!   to ms

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::observability::{MetricsError, MetricsResult};

/// Attempt counters of a [`crate::http::RetryingTransport`].
#[derive(Debug, Default)]
pub struct TransportMetrics {
    /// Total time spent in attempts in microseconds
    pub total_attempt_time_micros: AtomicU64,
    /// Last attempt time in microseconds
    pub last_attempt_time_micros: AtomicU64,
    /// Attempts that were sent (and settled or timed out)
    pub attempts: AtomicUsize,
    /// Backoff waits started
    pub retries: AtomicUsize,
    /// Responses with a retryable status
    pub transient: AtomicUsize,
    /// Responses with a non-retryable failure status
    pub permanent: AtomicUsize,
    /// Attempts that failed before a response arrived
    pub network_failures: AtomicUsize,
    /// Attempts aborted by the per-attempt timer
    pub timeouts: AtomicUsize,
    /// Fetches ended by the caller's cancellation token
    pub cancellations: AtomicUsize,
}

impl TransportMetrics {
    /// Counters starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settled attempt and its duration.
    pub fn record_attempt(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        self.total_attempt_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.attempts.fetch_add(1, Ordering::SeqCst);

        // Relaxed OK: last_attempt_time is not used in derived metrics
        self.last_attempt_time_micros.store(micros, Ordering::Relaxed);
    }

    /// Record a backoff wait before another attempt.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response with a retryable status.
    pub fn record_transient(&self) {
        self.transient.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response with a non-retryable failure status.
    pub fn record_permanent(&self) {
        self.permanent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an attempt that failed before any response arrived.
    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an attempt aborted by its timer.
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fetch ended by the caller's token.
    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Average attempt time in milliseconds.
    ///
    /// ## Memory Ordering
    /// Uses SeqCst to read a consistent snapshot of total time and count.
    pub fn get_avg_attempt_time_ms(&self) -> MetricsResult<f64> {
        let total_time = self.total_attempt_time_micros.load(Ordering::SeqCst);
        let count = self.attempts.load(Ordering::SeqCst);

        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average attempt time" });
        }

        Ok((total_time as f64 / count as f64) / 1_000.0)
    }

    /// Duration of the most recent attempt in milliseconds.
    #[must_use]
    pub fn get_last_attempt_time_ms(&self) -> u64 {
        self.last_attempt_time_micros.load(Ordering::Relaxed) / 1_000
    }

    /// Number of settled attempts.
    #[must_use]
    pub fn get_attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of backoff waits started.
    #[must_use]
    pub fn get_retry_count(&self) -> usize {
        self.retries.load(Ordering::Relaxed)
    }

    /// Number of responses with a retryable status.
    #[must_use]
    pub fn get_transient_count(&self) -> usize {
        self.transient.load(Ordering::Relaxed)
    }

    /// Number of responses with a non-retryable failure status.
    #[must_use]
    pub fn get_permanent_count(&self) -> usize {
        self.permanent.load(Ordering::Relaxed)
    }

    /// Number of attempts that failed before a response.
    #[must_use]
    pub fn get_network_failure_count(&self) -> usize {
        self.network_failures.load(Ordering::Relaxed)
    }

    /// Number of attempts that timed out.
    #[must_use]
    pub fn get_timeout_count(&self) -> usize {
        self.timeouts.load(Ordering::Relaxed)
    }

    /// Number of fetches ended by cancellation.
    #[must_use]
    pub fn get_cancellation_count(&self) -> usize {
        self.cancellations.load(Ordering::Relaxed)
    }

    /// Share of settled attempts that ended with a failure status, timeout
    /// or network error. `0.0` before the first attempt.
    #[must_use]
    pub fn get_failure_rate(&self) -> f64 {
        let attempts = self.get_attempt_count();
        if attempts == 0 {
            return 0.0;
        }
        let failures = self.get_transient_count()
            + self.get_permanent_count()
            + self.get_network_failure_count()
            + self.get_timeout_count();
        failures as f64 / attempts as f64
    }
}
