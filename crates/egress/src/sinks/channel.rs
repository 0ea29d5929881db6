//! ChannelSink - in-process outbound stream

use contracts::{ContractError, Record, RecordSink};
use tokio::sync::mpsc;
use tracing::instrument;

/// Sink that forwards records to an in-process consumer.
///
/// This is the outbound stream used when the receiving side lives in the
/// same process (tests, embedding). A dropped receiver is a peer disconnect
/// and fails the session, like any transport error would.
pub struct ChannelSink {
    name: String,
    tx: mpsc::Sender<Record>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its stream.
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<Record>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }

    /// Attach a sink to an existing sender.
    pub fn from_sender(name: impl Into<String>, tx: mpsc::Sender<Record>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

impl RecordSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "channel_sink_send",
        skip(self, record),
        fields(sink = %self.name, msg_id = record.header.msg_id)
    )]
    async fn send(&mut self, record: &Record) -> Result<(), ContractError> {
        self.tx
            .send(record.clone())
            .await
            .map_err(|_| ContractError::sink_write(&self.name, "receiver disconnected"))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        // Channel delivery is immediate
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        // Dropping the sender closes the stream for the receiver
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::RecordHeader;

    fn make_record(dest: u32) -> Record {
        Record::new(
            RecordHeader {
                dest,
                ..Default::default()
            },
            Bytes::from_static(b"x"),
        )
    }

    #[tokio::test]
    async fn delivers_to_receiver() {
        let (mut sink, mut rx) = ChannelSink::new("chan", 4);
        sink.send(&make_record(7)).await.unwrap();

        let got = rx.recv().await.unwrap();
        assert_eq!(got.header.dest, 7);
    }

    #[tokio::test]
    async fn disconnected_receiver_is_an_error() {
        let (mut sink, rx) = ChannelSink::new("chan", 4);
        drop(rx);

        let err = sink.send(&make_record(1)).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
    }
}
