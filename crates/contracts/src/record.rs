//! Record - 中继传输单元
//!
//! 不可变负载 + 各跳时间戳槽位。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 透传标识字段
///
/// 发送方填写的标识整数，核心不解释其含义，仅原样转发。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// 负载长度（发送方声明值，核心不校验）
    pub length: u32,

    /// 命令字
    pub command: u32,

    /// 目的地编号
    pub dest: u32,

    /// 消息 ID
    pub msg_id: u64,
}

/// 各跳时间戳（单调时钟秒，f64）
///
/// 仅用于外部延迟分析，不参与排序。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HopTimestamps {
    /// 发送方发出前打点（由调用方设置）
    pub sent: f64,

    /// 入队时打点（由 ingest 会话设置）
    pub received: Option<f64>,

    /// 出队派发时打点（由 egress 会话设置）
    pub dispatched: Option<f64>,

    /// 最终接收方打点，核心透传不使用
    pub delivered: f64,
}

impl HopTimestamps {
    /// 以发送时刻初始化，其余槽位留空
    pub fn at_send(sent: f64) -> Self {
        Self {
            sent,
            ..Default::default()
        }
    }

    /// 已设置的槽位是否满足 sent <= received <= dispatched
    ///
    /// 违反说明时钟回退或记录被重排，调用方应当记录而非掩盖。
    pub fn ordered(&self) -> bool {
        let mut prev = self.sent;
        for t in [self.received, self.dispatched].into_iter().flatten() {
            if t < prev {
                return false;
            }
            prev = t;
        }
        true
    }

    /// 队列逗留时长 (dispatched - received)
    pub fn queue_latency(&self) -> Option<f64> {
        Some(self.dispatched? - self.received?)
    }

    /// 中继端到端时长 (dispatched - sent)
    pub fn relay_latency(&self) -> Option<f64> {
        Some(self.dispatched? - self.sent)
    }
}

/// 中继数据记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// 标识字段
    pub header: RecordHeader,

    /// 数据载荷（零拷贝）
    pub payload: Bytes,

    /// 各跳时间戳
    pub hops: HopTimestamps,
}

impl Record {
    /// 创建未打点的记录
    pub fn new(header: RecordHeader, payload: Bytes) -> Self {
        Self {
            header,
            payload,
            hops: HopTimestamps::default(),
        }
    }

    /// 创建带发送时刻的记录
    pub fn with_sent(header: RecordHeader, payload: Bytes, sent: f64) -> Self {
        Self {
            header,
            payload,
            hops: HopTimestamps::at_send(sent),
        }
    }
}

/// ingest 会话结束应答
///
/// 回显最后一条记录的标识字段，外加固定应答码。
/// 不做任何聚合（计数、字节数、耗时均不统计）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    /// 最后一条记录的标识字段（空会话回默认值）
    pub header: RecordHeader,

    /// 应答码
    pub result: u32,
}

impl IngestAck {
    /// 固定应答码
    pub const RESULT_OK: u32 = 5;

    /// 由会话中最后见到的标识字段构造应答
    pub fn for_last(header: Option<RecordHeader>) -> Self {
        Self {
            header: header.unwrap_or_default(),
            result: Self::RESULT_OK,
        }
    }
}

/// egress 会话发起请求
///
/// 字段仅用于回显与日志，核心不使用其语义。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EgressRequest {
    /// 请求方标识字段
    pub header: RecordHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_with_all_slots() {
        let hops = HopTimestamps {
            sent: 1.0,
            received: Some(1.5),
            dispatched: Some(2.0),
            delivered: 0.0,
        };
        assert!(hops.ordered());
    }

    #[test]
    fn ordered_detects_regression() {
        let hops = HopTimestamps {
            sent: 1.0,
            received: Some(0.5),
            dispatched: None,
            delivered: 0.0,
        };
        assert!(!hops.ordered());

        let hops = HopTimestamps {
            sent: 1.0,
            received: Some(1.5),
            dispatched: Some(1.2),
            delivered: 0.0,
        };
        assert!(!hops.ordered());
    }

    #[test]
    fn ordered_skips_unset_slots() {
        // dispatched set without received still compares against sent
        let hops = HopTimestamps {
            sent: 1.0,
            received: None,
            dispatched: Some(2.0),
            delivered: 0.0,
        };
        assert!(hops.ordered());
        assert!(HopTimestamps::at_send(3.0).ordered());
    }

    #[test]
    fn latency_accessors() {
        let hops = HopTimestamps {
            sent: 1.0,
            received: Some(1.5),
            dispatched: Some(2.5),
            delivered: 0.0,
        };
        assert_eq!(hops.queue_latency(), Some(1.0));
        assert_eq!(hops.relay_latency(), Some(1.5));
        assert_eq!(HopTimestamps::at_send(1.0).queue_latency(), None);
    }

    #[test]
    fn ack_echoes_last_header() {
        let header = RecordHeader {
            length: 3,
            command: 2,
            dest: 9,
            msg_id: 41,
        };
        let ack = IngestAck::for_last(Some(header));
        assert_eq!(ack.header, header);
        assert_eq!(ack.result, IngestAck::RESULT_OK);
    }

    #[test]
    fn ack_for_empty_session() {
        let ack = IngestAck::for_last(None);
        assert_eq!(ack.header, RecordHeader::default());
        assert_eq!(ack.result, IngestAck::RESULT_OK);
    }

    #[test]
    fn record_serde_round_trip() {
        let record = Record::with_sent(
            RecordHeader {
                length: 5,
                command: 1,
                dest: 42,
                msg_id: 7,
            },
            Bytes::from_static(b"hello"),
            12.5,
        );
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.header, record.header);
        assert_eq!(parsed.payload, record.payload);
        assert_eq!(parsed.hops.sent, 12.5);
        assert_eq!(parsed.hops.received, None);
    }
}
