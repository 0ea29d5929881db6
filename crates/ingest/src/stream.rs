//! Inbound stream adapters
//!
//! `ChannelStream` bridges an async-channel receiver onto the
//! `RecordStream` seam; `ScriptedStream` replays a fixed item sequence for
//! deterministic tests.

use std::collections::VecDeque;

use async_channel::Receiver;
use contracts::{ContractError, Record, RecordStream};

/// Stream over an in-process channel.
///
/// Channel closure maps to clean end-of-stream; the channel itself cannot
/// surface transport errors.
pub struct ChannelStream {
    rx: Receiver<Record>,
}

impl ChannelStream {
    /// Wrap a receiver as an inbound stream.
    pub fn new(rx: Receiver<Record>) -> Self {
        Self { rx }
    }
}

impl RecordStream for ChannelStream {
    async fn next(&mut self) -> Option<Result<Record, ContractError>> {
        self.rx.recv().await.ok().map(Ok)
    }
}

/// Stream that replays a scripted item sequence.
///
/// Lets tests exercise clean close and mid-stream transport failure without
/// a transport.
#[derive(Default)]
pub struct ScriptedStream {
    items: VecDeque<Result<Record, ContractError>>,
}

impl ScriptedStream {
    /// Script the given items; the stream closes after the last one.
    pub fn new(items: impl IntoIterator<Item = Result<Record, ContractError>>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Script a sequence of well-formed records.
    pub fn of_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self::new(records.into_iter().map(Ok))
    }
}

impl RecordStream for ScriptedStream {
    async fn next(&mut self) -> Option<Result<Record, ContractError>> {
        self.items.pop_front()
    }
}
