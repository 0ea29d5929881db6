//! LogSink - logs record summary via tracing

use contracts::{ContractError, Record, RecordSink};
use tracing::{info, instrument};

/// Sink that logs record summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record_summary(&self, record: &Record) {
        info!(
            sink = %self.name,
            dest = record.header.dest,
            msg_id = record.header.msg_id,
            payload_bytes = record.payload.len(),
            queue_latency = record.hops.queue_latency(),
            "record dispatched"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_send",
        skip(self, record),
        fields(sink = %self.name, msg_id = record.header.msg_id)
    )]
    async fn send(&mut self, record: &Record) -> Result<(), ContractError> {
        self.log_record_summary(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
