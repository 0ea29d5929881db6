//! 记录生成源
//!
//! 用于无外部发送方环境的测试与演练。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::bounded;
use bytes::Bytes;
use contracts::{Clock, Record, RecordHeader, SourceConfig};
use tracing::{debug, trace};

use crate::stream::ChannelStream;

/// 记录生成源
///
/// 按配置频率生成带发送时刻的记录，目的地编号与消息 ID 单调递增。
pub struct GeneratorSource {
    config: SourceConfig,
    clock: Arc<dyn Clock>,
    running: Arc<AtomicBool>,
}

impl GeneratorSource {
    /// 创建新的生成源
    pub fn new(config: SourceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 源 ID
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// 启动生成源，返回入站流
    ///
    /// # Arguments
    /// * `channel_capacity` - 通道容量（发送端满时等待，形成自然背压）
    pub fn start(&self, channel_capacity: usize) -> ChannelStream {
        let (tx, rx) = bounded(channel_capacity);
        let config = self.config.clone();
        let clock = self.clock.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);
            let mut seq: u64 = 0;

            debug!(
                source_id = %config.id,
                frequency_hz = config.frequency_hz,
                record_count = config.record_count,
                "generator source started"
            );

            while running.load(Ordering::Relaxed) {
                if config.record_count > 0 && seq >= config.record_count {
                    break;
                }

                let header = RecordHeader {
                    length: config.payload_bytes as u32,
                    command: config.command,
                    dest: seq as u32,
                    msg_id: seq,
                };
                let payload = Bytes::from(vec![(seq % 251) as u8; config.payload_bytes]);
                let record = Record::with_sent(header, payload, clock.now());

                if tx.send(record).await.is_err() {
                    debug!(source_id = %config.id, "generator channel closed");
                    break;
                }

                trace!(source_id = %config.id, seq, "record generated");
                seq += 1;

                tokio::time::sleep(interval).await;
            }

            running.store(false, Ordering::SeqCst);
            debug!(source_id = %config.id, records = seq, "generator source stopped");
        });

        ChannelStream::new(rx)
    }

    /// 停止生成源
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// 检查是否正在运行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
