//! RecordSink trait - egress output interface
//!
//! Defines the abstract interface for outbound streams.

use crate::{ContractError, Record};

/// Outbound record stream
///
/// All egress outputs implement this trait.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one record to the outbound stream
    ///
    /// # Errors
    /// A send error means the peer is gone or the transport failed; the
    /// calling session terminates and must not retry through the same sink.
    async fn send(&mut self, record: &Record) -> Result<(), ContractError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close the sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
