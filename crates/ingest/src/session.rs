//! Ingest session - drives one inbound stream into the shared queue.

use std::sync::Arc;

use contracts::{Clock, IngestAck, RecordHeader, RecordStream};
use metrics::{counter, gauge};
use relay_queue::RelayQueue;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

use crate::config::IngestMetrics;
use crate::error::{IngestError, Result};

/// One inbound session.
///
/// Owns nothing shared except handles: the queue and clock are injected so
/// independent relays (and tests) can run side by side.
pub struct IngestSession {
    session_id: String,
    queue: RelayQueue,
    clock: Arc<dyn Clock>,
    metrics: Arc<IngestMetrics>,
}

impl IngestSession {
    /// Create a session with fresh metrics.
    pub fn new(session_id: impl Into<String>, queue: RelayQueue, clock: Arc<dyn Clock>) -> Self {
        Self::with_metrics(session_id, queue, clock, Arc::new(IngestMetrics::new()))
    }

    /// Create a session reporting into shared metrics.
    pub fn with_metrics(
        session_id: impl Into<String>,
        queue: RelayQueue,
        clock: Arc<dyn Clock>,
        metrics: Arc<IngestMetrics>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            queue,
            clock,
            metrics,
        }
    }

    /// Session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        self.metrics.clone()
    }

    /// Consume the inbound stream to completion.
    ///
    /// Each record is stamped with the arrival time and enqueued in arrival
    /// order. On clean close, returns an ack echoing the last record's
    /// header. On a transport error the session ends with `Err`; records
    /// accepted before the failure stay queued.
    #[instrument(
        name = "ingest_session_run",
        skip(self, stream),
        fields(session = %self.session_id)
    )]
    pub async fn run<S: RecordStream>(self, mut stream: S) -> Result<IngestAck> {
        debug!("ingest session started");

        let mut last: Option<RecordHeader> = None;
        let mut accepted: u64 = 0;

        while let Some(item) = stream.next().await {
            let mut record = match item {
                Ok(record) => record,
                Err(source) => {
                    self.metrics.record_stream_error();
                    warn!(error = %source, "inbound stream failed, aborting session");
                    return Err(IngestError::Stream {
                        session: self.session_id.clone(),
                        source,
                    });
                }
            };

            record.hops.received = Some(self.clock.now());
            self.metrics.record_received(record.payload.len());
            accepted += 1;

            trace!(
                dest = record.header.dest,
                msg_id = record.header.msg_id,
                "record accepted"
            );

            last = Some(record.header);
            self.queue.push(record);

            counter!(
                "frame_relay_records_ingested_total",
                "session" => self.session_id.clone()
            )
            .increment(1);
            gauge!("frame_relay_queue_depth").set(self.queue.len() as f64);
        }

        self.metrics.record_session_completed();
        debug!(records = accepted, "inbound stream closed, acking");

        Ok(IngestAck::for_last(last))
    }

    /// Run the session as a background task.
    pub fn spawn<S: RecordStream + 'static>(self, stream: S) -> JoinHandle<Result<IngestAck>> {
        tokio::spawn(self.run(stream))
    }
}
