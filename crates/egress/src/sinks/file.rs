//! FileSink - JSON-lines capture of dispatched records

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{ContractError, Record, RecordSink};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

/// Sink that appends each record as one JSON line.
///
/// Pointing `path` at a directory creates a timestamped capture file inside
/// it; pointing at a file path uses that file directly.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl FileSink {
    /// Create a new FileSink writing to `path`.
    #[instrument(name = "file_sink_new", skip(name, path))]
    pub async fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let name = name.into();
        let mut path = path.into();

        if path.is_dir() {
            let stamp = Local::now().format("%Y%m%d-%H%M%S");
            path = path.join(format!("capture-{stamp}.jsonl"));
        }

        let file = File::create(&path).await?;
        debug!(sink = %name, path = %path.display(), "FileSink opened");

        Ok(Self {
            name,
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    /// Create from params (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let path = params.get("path").ok_or_else(|| {
            ContractError::config_validation(format!("sinks[{name}].params.path"), "missing 'path'")
        })?;

        let path = PathBuf::from(path);
        Self::new(name.clone(), path)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    /// Path of the capture file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, ContractError> {
        self.writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "file already closed"))
    }
}

impl RecordSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_send",
        skip(self, record),
        fields(sink = %self.name, msg_id = record.header.msg_id)
    )]
    async fn send(&mut self, record: &Record) -> Result<(), ContractError> {
        let mut line = serde_json::to_vec(record)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        line.push(b'\n');

        self.writer()?.write_all(&line).await?;
        self.written += 1;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().await?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.shutdown().await?;
            debug!(sink = %self.name, records = self.written, "FileSink closed");
        }
        Ok(())
    }
}
