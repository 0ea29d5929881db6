//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Monotonic timestamps (seconds, f64) supplied by an injected [`Clock`]
//! - Delivery order is defined structurally by the relay queue, never by
//!   timestamp comparison

mod blueprint;
mod clock;
mod error;
mod record;
mod sink;
mod stream;

pub use blueprint::*;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::*;
pub use record::*;
pub use sink::*;
pub use stream::*;
