//! RecordStream trait - inbound stream seam
//!
//! Abstracts the client-streaming side of the transport so ingest sessions
//! stay decoupled from the RPC layer that feeds them.

use crate::{ContractError, Record};

/// Inbound record stream
///
/// Yields records in arrival order until the sender closes or the transport
/// fails.
#[trait_variant::make(RecordStream: Send)]
pub trait LocalRecordStream {
    /// Next record from the stream.
    ///
    /// `None` means the peer closed cleanly. An `Err` item is a transport
    /// failure; the stream must not be polled again afterwards.
    async fn next(&mut self) -> Option<Result<Record, ContractError>>;
}
