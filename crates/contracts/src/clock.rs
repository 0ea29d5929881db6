//! Clock - monotonic timestamp source
//!
//! Timestamps are fractional seconds (f64) intended for elapsed-time
//! analysis. Ordering inside the relay is structural (queue order), never a
//! timestamp comparison.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time provider
///
/// Treated as infallible; implementations must never go backwards.
pub trait Clock: Send + Sync {
    /// Current monotonic time in seconds.
    fn now(&self) -> f64;
}

/// System clock anchored at construction.
///
/// Reads `Instant::elapsed` so values are comparable only within one clock
/// instance. Share a single instance across all sessions of a relay.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for deterministic tests.
///
/// Stores the current time as f64 bits in an atomic, so it can be shared and
/// advanced from any thread.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Create a manual clock starting at `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Set the current time.
    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    /// Advance the current time by `secs`.
    pub fn advance(&self, secs: f64) {
        self.bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f64::from_bits(bits) + secs).to_bits())
            })
            .ok();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
