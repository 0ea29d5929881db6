//! Ingest metrics and shared session counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingest metrics
///
/// Shared across sessions of one relay; updated lock-free.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Total records accepted and enqueued
    pub records_received: AtomicU64,

    /// Total payload bytes accepted
    pub bytes_received: AtomicU64,

    /// Inbound stream transport errors
    pub stream_errors: AtomicU64,

    /// Sessions that reached clean stream close
    pub sessions_completed: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted record with its payload size
    pub fn record_received(&self, payload_bytes: usize) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(payload_bytes as u64, Ordering::Relaxed);
    }

    /// Record an inbound transport failure
    pub fn record_stream_error(&self) {
        self.stream_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cleanly completed session
    pub fn record_session_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
            sessions_completed: self.sessions_completed.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Total records accepted and enqueued
    pub records_received: u64,

    /// Total payload bytes accepted
    pub bytes_received: u64,

    /// Inbound stream transport errors
    pub stream_errors: u64,

    /// Sessions that reached clean stream close
    pub sessions_completed: u64,
}
