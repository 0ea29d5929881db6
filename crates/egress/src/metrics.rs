//! Egress session metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single egress session
#[derive(Debug, Default)]
pub struct EgressMetrics {
    /// Total records dispatched to the outbound stream
    dispatched_count: AtomicU64,

    /// Total outbound send failures
    failure_count: AtomicU64,

    /// Records whose hop timestamps regressed (clock skew observations)
    skew_count: AtomicU64,
}

impl EgressMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total dispatched count
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched_count.load(Ordering::Relaxed)
    }

    /// Increment dispatched count
    pub fn inc_dispatched_count(&self) {
        self.dispatched_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get clock-skew observation count
    pub fn skew_count(&self) -> u64 {
        self.skew_count.load(Ordering::Relaxed)
    }

    /// Increment clock-skew observation count
    pub fn inc_skew_count(&self) {
        self.skew_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched_count: self.dispatched_count(),
            failure_count: self.failure_count(),
            skew_count: self.skew_count(),
        }
    }
}

/// Snapshot of egress metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub dispatched_count: u64,
    pub failure_count: u64,
    pub skew_count: u64,
}
