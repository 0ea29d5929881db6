//! Pipeline statistics and metrics.

use std::time::Duration;

use contracts::IngestAck;
use observability::MetricsSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total records accepted and enqueued
    pub records_ingested: u64,

    /// Total payload bytes accepted
    pub bytes_ingested: u64,

    /// Total records dispatched across all sinks
    pub records_dispatched: u64,

    /// Outbound send failures across all sinks
    pub dispatch_failures: u64,

    /// Inbound stream transport errors
    pub stream_errors: u64,

    /// Records still queued when the run ended
    pub queue_residual: usize,

    /// Acks returned by completed ingest sessions
    pub acks: Vec<IngestAck>,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sources that were active
    pub active_sources: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Latency summary from the dispatch aggregator
    pub relay_metrics: MetricsSummary,
}

impl PipelineStats {
    /// Calculate records-per-second throughput on the egress side
    pub fn rps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate dispatch failure rate as percentage
    #[allow(dead_code)]
    pub fn failure_rate(&self) -> f64 {
        let total = self.records_dispatched + self.dispatch_failures;
        if total > 0 {
            (self.dispatch_failures as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records ingested: {}", self.records_ingested);
        println!("   ├─ Bytes ingested: {}", self.bytes_ingested);
        println!("   ├─ Records dispatched: {}", self.records_dispatched);
        println!("   ├─ Dispatch rate: {:.2} rec/s", self.rps());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Relay Metrics");
        println!("   ├─ Stream errors: {}", self.stream_errors);
        println!("   ├─ Dispatch failures: {}", self.dispatch_failures);
        println!("   ├─ Queue residual: {}", self.queue_residual);
        println!(
            "   ├─ Queue latency (ms): {}",
            self.relay_metrics.queue_latency_ms
        );
        println!(
            "   └─ Relay latency (ms): {}",
            self.relay_metrics.relay_latency_ms
        );

        if !self.acks.is_empty() {
            println!("\n✅ Session Acks");
            for (i, ack) in self.acks.iter().enumerate() {
                let prefix = if i == self.acks.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!(
                    "   {} dest={} msg_id={} result={}",
                    prefix, ack.header.dest, ack.header.msg_id, ack.result
                );
            }
        }

        println!();
    }
}
