//! Ingest 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingest 错误
#[derive(Debug, Error)]
pub enum IngestError {
    /// 入站流传输失败
    #[error("inbound stream error in session '{session}': {source}")]
    Stream {
        /// 会话 ID
        session: String,
        #[source]
        source: ContractError,
    },
}

/// Ingest Result 类型别名
pub type Result<T> = std::result::Result<T, IngestError>;
