//! Shared FIFO record queue with blocking dequeue.
//!
//! A single mutex guards the deque; waiting consumers park on a
//! `tokio::sync::Notify` and wake immediately on push. The lock is never
//! held across an await.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use contracts::Record;
use tokio::sync::Notify;
use tracing::warn;

const DEFAULT_WARN_DEPTH: usize = 10_000;

/// Cheap-clone handle to one shared relay queue.
///
/// All ingest and egress sessions of a relay hold clones of the same handle;
/// the queue lives as long as any handle does. Records are delivered in
/// strict enqueue order, each to exactly one consumer (competing consumers,
/// not broadcast).
#[derive(Clone)]
pub struct RelayQueue {
    inner: Arc<Shared>,
}

struct Shared {
    records: Mutex<VecDeque<Record>>,
    /// One permit per push; wakes one parked consumer.
    available: Notify,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    warn_depth: usize,
}

impl RelayQueue {
    /// Create an empty queue with the default depth-warning threshold.
    pub fn new() -> Self {
        Self::with_warn_depth(DEFAULT_WARN_DEPTH)
    }

    /// Create an empty queue that warns once the depth reaches `warn_depth`.
    ///
    /// The queue itself is unbounded; the threshold only drives a diagnostic
    /// log so a stalled egress side is visible.
    pub fn with_warn_depth(warn_depth: usize) -> Self {
        Self {
            inner: Arc::new(Shared {
                records: Mutex::new(VecDeque::new()),
                available: Notify::new(),
                enqueued: AtomicU64::new(0),
                dequeued: AtomicU64::new(0),
                warn_depth,
            }),
        }
    }

    /// Append a record at the tail. Never blocks, always succeeds.
    pub fn push(&self, record: Record) {
        let depth = {
            let mut records = self.lock();
            records.push_back(record);
            records.len()
        };
        self.inner.enqueued.fetch_add(1, Ordering::Relaxed);

        if depth == self.inner.warn_depth {
            warn!(depth, "relay queue depth reached warning threshold");
        }

        self.inner.available.notify_one();
    }

    /// Remove and return the head record, if any.
    pub fn try_pop(&self) -> Option<Record> {
        let record = self.lock().pop_front();
        if record.is_some() {
            self.inner.dequeued.fetch_add(1, Ordering::Relaxed);
        }
        record
    }

    /// Remove and return the head record, waiting while the queue is empty.
    ///
    /// Cancel-safe: the record is taken and returned within a single poll,
    /// so dropping the future at the await point cannot lose a record, and a
    /// wakeup consumed by a dropped future is handed to the next waiter.
    pub async fn pop(&self) -> Record {
        loop {
            if let Some(record) = self.try_pop() {
                return record;
            }

            let notified = self.inner.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            // Re-check after registering: a push between the first check and
            // `enable` would otherwise be missed.
            if let Some(record) = self.try_pop() {
                return record;
            }

            notified.await;
        }
    }

    /// As [`pop`](Self::pop), but give up after `timeout`.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<Record> {
        tokio::time::timeout(timeout, self.pop()).await.ok()
    }

    /// Current depth, for diagnostics only.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total records ever enqueued.
    pub fn enqueued_total(&self) -> u64 {
        self.inner.enqueued.load(Ordering::Relaxed)
    }

    /// Total records ever dequeued.
    pub fn dequeued_total(&self) -> u64 {
        self.inner.dequeued.load(Ordering::Relaxed)
    }

    // A session that panicked while holding the lock must not wedge every
    // other session; the deque itself is always in a consistent state between
    // push_back/pop_front calls.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Record>> {
        match self.inner.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RelayQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RelayQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayQueue")
            .field("len", &self.len())
            .field("enqueued", &self.enqueued_total())
            .field("dequeued", &self.dequeued_total())
            .finish()
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
                length: 4,
                command: 2,
                dest,
                msg_id: dest as u64,
            },
            Bytes::from_static(b"data"),
        )
    }

    #[tokio::test]
    async fn fifo_order_preserved() {
        let queue = RelayQueue::new();
        for dest in 0..10 {
            queue.push(make_record(dest));
        }

        for dest in 0..10 {
            assert_eq!(queue.pop().await.header.dest, dest);
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn try_pop_on_empty() {
        let queue = RelayQueue::new();
        assert!(queue.try_pop().is_none());

        queue.push(make_record(1));
        assert_eq!(queue.try_pop().unwrap().header.dest, 1);
    }

    #[tokio::test]
    async fn pop_blocks_until_push() {
        let queue = RelayQueue::new();

        let consumer = queue.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });

        // Give the consumer time to park on the empty queue.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        queue.push(make_record(42));
        let record = handle.await.unwrap();
        assert_eq!(record.header.dest, 42);
    }

    #[tokio::test]
    async fn pop_timeout_on_empty() {
        let queue = RelayQueue::new();
        let got = queue.pop_timeout(Duration::from_millis(10)).await;
        assert!(got.is_none());

        queue.push(make_record(7));
        let got = queue.pop_timeout(Duration::from_millis(10)).await;
        assert_eq!(got.unwrap().header.dest, 7);
    }

    #[tokio::test]
    async fn cancelled_waiter_releases_wakeup() {
        let queue = RelayQueue::new();

        // Park a waiter, then drop it before any push.
        let waiter = queue.clone();
        let handle = tokio::spawn(async move { waiter.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();
        let _ = handle.await;

        // The record pushed afterwards must still reach a live consumer.
        queue.push(make_record(5));
        let got = queue.pop_timeout(Duration::from_millis(100)).await;
        assert_eq!(got.unwrap().header.dest, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_and_consumers() {
        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 250;
        const CONSUMERS: u64 = 3;

        let queue = RelayQueue::new();

        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let queue = queue.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..PER_PRODUCER {
                    let mut record = make_record((p * PER_PRODUCER + i) as u32);
                    record.header.msg_id = p * PER_PRODUCER + i;
                    queue.push(record);
                    tokio::task::yield_now().await;
                }
            }));
        }

        let total = PRODUCERS * PER_PRODUCER;
        let mut consumers = Vec::new();
        for _ in 0..CONSUMERS {
            let queue = queue.clone();
            consumers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(record) = queue.pop_timeout(Duration::from_millis(200)).await {
                    seen.push(record.header.msg_id);
                }
                seen
            }));
        }

        for producer in producers {
            producer.await.unwrap();
        }

        let mut all_ids = Vec::new();
        for consumer in consumers {
            all_ids.extend(consumer.await.unwrap());
        }

        // No loss, no duplication across any interleaving.
        all_ids.sort_unstable();
        let expected: Vec<u64> = (0..total).collect();
        assert_eq!(all_ids, expected);
        assert_eq!(queue.enqueued_total(), total);
        assert_eq!(queue.dequeued_total(), total);
    }

    #[tokio::test]
    async fn single_drain_observes_global_order() {
        let queue = RelayQueue::new();

        // Two producers interleave, but whatever order the pushes landed in
        // is the order a single drain must observe.
        let q1 = queue.clone();
        let a = tokio::spawn(async move {
            for i in 0..50 {
                q1.push(make_record(i * 2));
                tokio::task::yield_now().await;
            }
        });
        let q2 = queue.clone();
        let b = tokio::spawn(async move {
            for i in 0..50 {
                q2.push(make_record(i * 2 + 1));
                tokio::task::yield_now().await;
            }
        });
        a.await.unwrap();
        b.await.unwrap();

        // Per-producer relative order is preserved in the global sequence.
        let mut evens = Vec::new();
        let mut odds = Vec::new();
        while let Some(record) = queue.try_pop() {
            if record.header.dest % 2 == 0 {
                evens.push(record.header.dest);
            } else {
                odds.push(record.header.dest);
            }
        }
        assert_eq!(evens, (0..50).map(|i| i * 2).collect::<Vec<_>>());
        assert_eq!(odds, (0..50).map(|i| i * 2 + 1).collect::<Vec<_>>());
    }
}
