//! # Relay Queue
//!
//! 进程内共享 FIFO 队列。
//!
//! 负责：
//! - 连接 ingest 与 egress 会话的唯一同步点
//! - 并发生产者/消费者下保序、不丢、不重
//! - 空队列阻塞等待，入队即唤醒
//!
//! ## 使用示例
//!
//! ```ignore
//! use relay_queue::RelayQueue;
//!
//! let queue = RelayQueue::new();
//! let consumer = queue.clone();
//!
//! queue.push(record);
//! let record = consumer.pop().await;
//! ```

mod queue;

pub use queue::RelayQueue;

// Re-export contracts types
pub use contracts::Record;
