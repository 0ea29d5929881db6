//! # Ingest
//!
//! Inbound session handling.
//!
//! Responsibilities:
//! - Drive one inbound `RecordStream` per session
//! - Stamp each record's arrival time from the shared clock
//! - Enqueue into the shared `RelayQueue`, preserving arrival order
//! - Acknowledge stream close by echoing the last record's header
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingest::IngestSession;
//!
//! let session = IngestSession::new("sender-1", queue.clone(), clock.clone());
//! let ack = session.run(stream).await?;
//! println!("last dest: {}", ack.header.dest);
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingest::GeneratorSource;
//!
//! let source = GeneratorSource::new(config, clock);
//! let stream = source.start(100);
//! ```

mod config;
mod error;
mod session;
mod source;
mod stream;

// Re-exports
pub use config::{IngestMetrics, MetricsSnapshot};
pub use contracts::{IngestAck, Record};
pub use error::{IngestError, Result};
pub use session::IngestSession;
pub use source::GeneratorSource;
pub use stream::{ChannelStream, ScriptedStream};
