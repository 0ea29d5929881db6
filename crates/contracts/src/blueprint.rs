//! RelayBlueprint - Config Loader 输出
//!
//! 描述完整的中继运行配置：队列参数、生成源、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的中继配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 中继运行参数
    #[serde(default)]
    pub relay: RelaySettings,

    /// 生成源定义列表（每个源驱动一个 ingest 会话）
    pub sources: Vec<SourceConfig>,

    /// 输出路由配置（每个 sink 驱动一个 egress 会话）
    pub sinks: Vec<SinkConfig>,
}

/// 中继运行参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// 队列深度告警阈值（队列无上限，仅用于诊断日志）
    #[serde(default = "default_queue_warn_depth")]
    pub queue_warn_depth: usize,

    /// Prometheus 端口 (None = 禁用)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            queue_warn_depth: default_queue_warn_depth(),
            metrics_port: None,
        }
    }
}

fn default_queue_warn_depth() -> usize {
    10_000
}

/// 生成源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 唯一标识符
    pub id: String,

    /// 发送频率 (Hz)，必须 > 0
    pub frequency_hz: f64,

    /// 发送记录条数 (0 = 不限)
    #[serde(default)]
    pub record_count: u64,

    /// 每条记录的负载字节数
    #[serde(default = "default_payload_bytes")]
    pub payload_bytes: usize,

    /// 记录命令字（原样透传）
    #[serde(default)]
    pub command: u32,
}

fn default_payload_bytes() -> usize {
    64
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 文件输出 (JSON lines)
    File,
    /// 网络输出 (UDP)
    Network,
}

impl RelayBlueprint {
    /// 全部源的预期记录总数
    ///
    /// 任一源不限量时返回 None。
    pub fn expected_records(&self) -> Option<u64> {
        let mut total = 0u64;
        for source in &self.sources {
            if source.record_count == 0 {
                return None;
            }
            total += source.record_count;
        }
        Some(total)
    }
}
