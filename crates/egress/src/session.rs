//! Egress session - drains the shared queue onto one outbound stream.

use std::sync::Arc;

use contracts::{Clock, EgressRequest, RecordSink};
use observability::RelayLatencyAggregator;
use relay_queue::RelayQueue;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace, warn};

use crate::error::EgressError;
use crate::metrics::EgressMetrics;

/// One outbound session.
///
/// Competes with other sessions for queued records: each record goes to
/// exactly one session. Cancellation stops draining without touching records
/// still queued; an outbound failure terminates only this session.
pub struct EgressSession<S: RecordSink> {
    request: EgressRequest,
    queue: RelayQueue,
    clock: Arc<dyn Clock>,
    sink: S,
    metrics: Arc<EgressMetrics>,
    aggregator: Option<Arc<RelayLatencyAggregator>>,
    cancel: CancellationToken,
}

impl<S: RecordSink + 'static> EgressSession<S> {
    /// Create a session for `sink`, driven by the shared queue and clock.
    pub fn new(
        request: EgressRequest,
        queue: RelayQueue,
        clock: Arc<dyn Clock>,
        sink: S,
    ) -> Self {
        Self {
            request,
            queue,
            clock,
            sink,
            metrics: Arc::new(EgressMetrics::new()),
            aggregator: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a shared latency aggregator for end-of-run summaries.
    pub fn with_aggregator(mut self, aggregator: Arc<RelayLatencyAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Token that stops the session at its next suspension point.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<EgressMetrics> {
        self.metrics.clone()
    }

    /// Drain the queue until cancelled or the sink fails.
    ///
    /// An empty queue blocks the session; emptiness is not end-of-stream.
    #[instrument(
        name = "egress_session_run",
        skip(self),
        fields(sink = %self.sink.name())
    )]
    pub async fn run(mut self) -> Result<(), EgressError> {
        debug!(
            dest = self.request.header.dest,
            msg_id = self.request.header.msg_id,
            "egress session started"
        );

        loop {
            let mut record = tokio::select! {
                _ = self.cancel.cancelled() => break,
                record = self.queue.pop() => record,
            };

            record.hops.dispatched = Some(self.clock.now());
            if !record.hops.ordered() {
                self.metrics.inc_skew_count();
                warn!(
                    msg_id = record.header.msg_id,
                    sent = record.hops.sent,
                    received = record.hops.received,
                    dispatched = record.hops.dispatched,
                    "hop timestamps regressed (clock skew?)"
                );
            }

            if let Err(e) = self.sink.send(&record).await {
                self.metrics.inc_failure_count();
                observability::record_dispatch_metrics(&record.hops, self.sink.name(), false);
                error!(
                    msg_id = record.header.msg_id,
                    error = %e,
                    "outbound send failed, terminating session"
                );
                let _ = self.sink.close().await;
                return Err(e.into());
            }

            self.metrics.inc_dispatched_count();
            observability::record_dispatch_metrics(&record.hops, self.sink.name(), true);
            observability::record_queue_depth(self.queue.len());
            if let Some(aggregator) = &self.aggregator {
                aggregator.observe(&record.hops);
            }

            trace!(
                dest = record.header.dest,
                msg_id = record.header.msg_id,
                "record dispatched"
            );
        }

        debug!(
            dispatched = self.metrics.dispatched_count(),
            "egress session cancelled"
        );

        if let Err(e) = self.sink.flush().await {
            error!(error = %e, "flush failed on shutdown");
        }
        if let Err(e) = self.sink.close().await {
            error!(error = %e, "close failed on shutdown");
        }

        Ok(())
    }

    /// Run the session as a background task, returning its handle.
    pub fn spawn(self) -> EgressHandle {
        let name = self.sink.name().to_string();
        let cancel = self.cancel.clone();
        let metrics = self.metrics.clone();
        let task = tokio::spawn(self.run());

        EgressHandle {
            name,
            cancel,
            metrics,
            task,
        }
    }
}

/// Handle to a running egress session
pub struct EgressHandle {
    name: String,
    cancel: CancellationToken,
    metrics: Arc<EgressMetrics>,
    task: JoinHandle<Result<(), EgressError>>,
}

impl EgressHandle {
    /// Sink name the session writes to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session metrics
    pub fn metrics(&self) -> &Arc<EgressMetrics> {
        &self.metrics
    }

    /// Whether the session already terminated (sink failure)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the session and wait for it to wind down.
    #[instrument(name = "egress_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> Result<(), EgressError> {
        self.cancel.cancel();
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                error!(sink = %self.name, error = ?e, "egress task panicked");
                Ok(())
            }
        }
    }
}
