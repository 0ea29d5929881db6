//! Sink implementations
//!
//! Contains LogSink, ChannelSink, FileSink, and UdpSink, plus the factory
//! that spawns an egress session for a configured sink.

mod channel;
mod file;
mod log;
mod network;

pub use self::channel::ChannelSink;
pub use self::file::FileSink;
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, UdpSink, UdpSinkConfig};

use std::sync::Arc;

use contracts::{Clock, EgressRequest, SinkConfig, SinkType};
use observability::RelayLatencyAggregator;
use relay_queue::RelayQueue;
use tracing::instrument;

use crate::error::EgressError;
use crate::session::{EgressHandle, EgressSession};

/// Create the configured sink and spawn an egress session draining into it.
#[instrument(
    name = "egress_spawn_configured",
    skip(config, queue, clock, aggregator),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn spawn_configured_session(
    config: &SinkConfig,
    request: EgressRequest,
    queue: RelayQueue,
    clock: Arc<dyn Clock>,
    aggregator: Option<Arc<RelayLatencyAggregator>>,
) -> Result<EgressHandle, EgressError> {
    fn start<S: contracts::RecordSink + 'static>(
        request: EgressRequest,
        queue: RelayQueue,
        clock: Arc<dyn Clock>,
        aggregator: Option<Arc<RelayLatencyAggregator>>,
        sink: S,
    ) -> EgressHandle {
        let mut session = EgressSession::new(request, queue, clock, sink);
        if let Some(aggregator) = aggregator {
            session = session.with_aggregator(aggregator);
        }
        session.spawn()
    }

    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(start(request, queue, clock, aggregator, sink))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| EgressError::sink_creation(&config.name, e.to_string()))?;
            Ok(start(request, queue, clock, aggregator, sink))
        }
        SinkType::Network => {
            let sink = UdpSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| EgressError::sink_creation(&config.name, e.to_string()))?;
            Ok(start(request, queue, clock, aggregator, sink))
        }
    }
}
