//! Pipeline orchestrator - coordinates all components.
//!
//! Wires generator sources into ingest sessions, spawns one egress session
//! per configured sink, and waits for the relay to drain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{Clock, EgressRequest, MonotonicClock, RelayBlueprint};
use egress::spawn_configured_session;
use ingest::{GeneratorSource, IngestMetrics, IngestSession};
use observability::RelayLatencyAggregator;
use relay_queue::RelayQueue;
use tokio::time::sleep;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay blueprint configuration
    pub blueprint: RelayBlueprint,

    /// Maximum number of records to ingest (None = unlimited)
    pub max_records: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size for inbound source streams
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // The queue and clock are the only shared pieces; everything else is
        // per-session.
        let queue = RelayQueue::with_warn_depth(blueprint.relay.queue_warn_depth);
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        let aggregator = Arc::new(RelayLatencyAggregator::new());
        let ingest_metrics = Arc::new(IngestMetrics::new());

        // Egress sessions first: starting against an empty queue just blocks
        // them until data arrives.
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - queued records will never drain");
        }

        let mut egress_handles = Vec::with_capacity(blueprint.sinks.len());
        for sink_config in &blueprint.sinks {
            let handle = spawn_configured_session(
                sink_config,
                EgressRequest::default(),
                queue.clone(),
                clock.clone(),
                Some(aggregator.clone()),
            )
            .await
            .with_context(|| format!("Failed to start egress session '{}'", sink_config.name))?;
            egress_handles.push(handle);
        }

        let active_sinks = egress_handles.len();
        info!(active_sinks, "Egress sessions started");

        // Ingest sessions, one per configured source.
        let mut sources = Vec::with_capacity(blueprint.sources.len());
        let mut ingest_joins = Vec::with_capacity(blueprint.sources.len());
        for source_config in &blueprint.sources {
            let source = GeneratorSource::new(source_config.clone(), clock.clone());
            let stream = source.start(self.config.buffer_size);

            let session = IngestSession::with_metrics(
                source_config.id.clone(),
                queue.clone(),
                clock.clone(),
                ingest_metrics.clone(),
            );
            ingest_joins.push(session.spawn(stream));
            sources.push(source);
        }
        let sources = Arc::new(sources);

        let active_sources = sources.len();
        info!(active_sources, "Ingest sessions started");

        // Stop sources once the ingest cap is hit.
        let limiter = self.config.max_records.map(|max| {
            let metrics = ingest_metrics.clone();
            let sources = sources.clone();
            tokio::spawn(async move {
                loop {
                    if metrics.snapshot().records_received >= max {
                        info!(max, "Reached max records limit, stopping sources");
                        for source in sources.iter() {
                            source.stop();
                        }
                        break;
                    }
                    sleep(Duration::from_millis(20)).await;
                }
            })
        });

        // Wait for every ingest session to ack, then for the queue to drain.
        let drain_queue = queue.clone();
        let wait_for_drain = active_sinks > 0;
        let pipeline_task = async move {
            let mut acks = Vec::new();
            for join in ingest_joins {
                match join.await {
                    Ok(Ok(ack)) => {
                        info!(
                            dest = ack.header.dest,
                            msg_id = ack.header.msg_id,
                            result = ack.result,
                            "Ingest session acked"
                        );
                        acks.push(ack);
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "Ingest session failed");
                    }
                    Err(e) => {
                        warn!(error = ?e, "Ingest task panicked");
                    }
                }
            }

            while wait_for_drain && drain_queue.dequeued_total() < drain_queue.enqueued_total() {
                sleep(Duration::from_millis(10)).await;
            }

            acks
        };

        // Run with optional timeout
        let acks = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(acks) => acks,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    Vec::new()
                }
            }
        } else {
            pipeline_task.await
        };

        // Shutdown
        info!("Shutting down pipeline...");
        if let Some(limiter) = limiter {
            limiter.abort();
        }
        for source in sources.iter() {
            source.stop();
        }

        let mut records_dispatched = 0;
        let mut dispatch_failures = 0;
        for handle in egress_handles {
            let metrics = Arc::clone(handle.metrics());
            if let Err(e) = handle.shutdown().await {
                warn!(error = %e, "Egress session ended with error");
            }
            let snapshot = metrics.snapshot();
            records_dispatched += snapshot.dispatched_count;
            dispatch_failures += snapshot.failure_count;
        }

        let ingest_snapshot = ingest_metrics.snapshot();
        let stats = PipelineStats {
            records_ingested: ingest_snapshot.records_received,
            bytes_ingested: ingest_snapshot.bytes_received,
            records_dispatched,
            dispatch_failures,
            stream_errors: ingest_snapshot.stream_errors,
            queue_residual: queue.len(),
            acks,
            duration: start_time.elapsed(),
            active_sources,
            active_sinks,
            relay_metrics: aggregator.summary(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rps = format!("{:.2}", stats.rps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
