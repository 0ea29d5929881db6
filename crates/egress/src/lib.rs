//! # Egress
//!
//! 出站派发模块。
//!
//! 负责：
//! - 从共享 `RelayQueue` 按序取出记录
//! - 打派发时间戳后写入出站流
//! - 多会话竞争消费（每条记录恰好送达一个会话）
//! - 协作式取消，不丢弃仍在队列中的记录

pub mod error;
pub mod metrics;
pub mod session;
pub mod sinks;

pub use contracts::{EgressRequest, Record, RecordSink};
pub use error::EgressError;
pub use metrics::{EgressMetrics, MetricsSnapshot};
pub use session::{EgressHandle, EgressSession};
pub use sinks::{spawn_configured_session, ChannelSink, FileSink, LogSink, UdpSink};
