//! 中继指标收集模块
//!
//! 基于各跳时间戳收集派发延迟指标。

use std::sync::Mutex;

use contracts::HopTimestamps;
// leading :: disambiguates the extern crate from this module
use ::metrics::{counter, gauge, histogram};

/// 记录队列深度
pub fn record_queue_depth(depth: usize) {
    gauge!("frame_relay_queue_depth").set(depth as f64);
}

/// 从各跳时间戳记录派发指标
///
/// 每派发一条记录时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch_metrics;
///
/// record.hops.dispatched = Some(clock.now());
/// record_dispatch_metrics(&record.hops, "log_sink", true);
/// ```
pub fn record_dispatch_metrics(hops: &HopTimestamps, sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "frame_relay_records_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    // 队列逗留时长 (秒 -> 毫秒)
    if let Some(queue_latency) = hops.queue_latency() {
        histogram!("frame_relay_queue_latency_ms").record(queue_latency * 1000.0);
    }

    // 端到端时长
    if let Some(relay_latency) = hops.relay_latency() {
        histogram!("frame_relay_latency_ms").record(relay_latency * 1000.0);
    }

    // 时间戳回退（时钟偏斜观测）
    if !hops.ordered() {
        counter!("frame_relay_clock_skew_total").increment(1);
    }
}

/// 派发延迟聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。可跨会话共享。
#[derive(Debug, Default)]
pub struct RelayLatencyAggregator {
    inner: Mutex<AggregatorInner>,
}

#[derive(Debug, Default)]
struct AggregatorInner {
    total_dispatched: u64,
    total_skewed: u64,
    queue_latency_ms: RunningStats,
    relay_latency_ms: RunningStats,
}

impl RelayLatencyAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次派发
    pub fn observe(&self, hops: &HopTimestamps) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        inner.total_dispatched += 1;
        if !hops.ordered() {
            inner.total_skewed += 1;
        }
        if let Some(queue_latency) = hops.queue_latency() {
            inner.queue_latency_ms.push(queue_latency * 1000.0);
        }
        if let Some(relay_latency) = hops.relay_latency() {
            inner.relay_latency_ms.push(relay_latency * 1000.0);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        MetricsSummary {
            total_dispatched: inner.total_dispatched,
            total_skewed: inner.total_skewed,
            skew_rate: if inner.total_dispatched > 0 {
                inner.total_skewed as f64 / inner.total_dispatched as f64 * 100.0
            } else {
                0.0
            },
            queue_latency_ms: StatsSummary::from(&inner.queue_latency_ms),
            relay_latency_ms: StatsSummary::from(&inner.relay_latency_ms),
        }
    }

    /// 重置统计
    pub fn reset(&self) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *inner = AggregatorInner::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_dispatched: u64,
    pub total_skewed: u64,
    pub skew_rate: f64,
    pub queue_latency_ms: StatsSummary,
    pub relay_latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Metrics Summary ===")?;
        writeln!(f, "Records dispatched: {}", self.total_dispatched)?;
        writeln!(
            f,
            "Skewed timestamps: {} ({:.2}%)",
            self.total_skewed, self.skew_rate
        )?;
        writeln!(f, "Queue latency (ms): {}", self.queue_latency_ms)?;
        writeln!(f, "Relay latency (ms): {}", self.relay_latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
