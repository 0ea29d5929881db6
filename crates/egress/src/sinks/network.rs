//! UdpSink - UDP fire-and-forget streaming

use contracts::{ContractError, Record, RecordSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for UdpSink
#[derive(Debug, Clone)]
pub struct UdpSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max packet size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl UdpSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends records over UDP
pub struct UdpSink {
    name: String,
    config: UdpSinkConfig,
    socket: Option<UdpSocket>,
}

impl UdpSink {
    /// Create a new UdpSink
    #[instrument(name = "udp_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: UdpSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "UdpSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "udp_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = UdpSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("sinks[{name}].params"), e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    fn serialize_record(&self, record: &Record) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(record).map_err(|e| format!("json error: {}", e))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(record).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))
    }

    fn prepare_payload(&self, record: &Record) -> Result<Vec<u8>, ContractError> {
        let data = self
            .serialize_record(record)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Packet exceeds max datagram size"
            );
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], msg_id: u64) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(sink = %self.name, msg_id, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl RecordSink for UdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "udp_sink_send",
        skip(self, record),
        fields(sink = %self.name, msg_id = record.header.msg_id)
    )]
    async fn send(&mut self, record: &Record) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(record)?;
        self.transmit(socket, &data, record.header.msg_id).await;
        Ok(())
    }

    #[instrument(name = "udp_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "udp_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "UdpSink closed");
        Ok(())
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
                dest,
                ..Default::default()
            },
            Bytes::from_static(b"payload"),
        )
    }

    #[tokio::test]
    async fn udp_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());

        let config = UdpSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Bincode);
    }

    #[tokio::test]
    async fn udp_sink_config_rejects_unknown_format() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "xml".to_string());

        assert!(UdpSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn udp_sink_create() {
        let config = UdpSinkConfig {
            addr: "127.0.0.1:19999".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        // Should succeed even if no receiver (UDP doesn't care)
        let sink = UdpSink::new("test_net", config).await;
        assert!(sink.is_ok());
    }

    #[tokio::test]
    async fn udp_sink_send_best_effort() {
        let config = UdpSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        let mut sink = UdpSink::new("test_net", config).await.unwrap();
        // Should not fail even with no receiver
        assert!(sink.send(&make_record(1)).await.is_ok());
    }

    #[tokio::test]
    async fn records_survive_a_local_round_trip() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap();

        let config = UdpSinkConfig {
            addr,
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };
        let mut sink = UdpSink::new("test_net", config).await.unwrap();
        sink.send(&make_record(42)).await.unwrap();

        let mut buf = vec![0u8; 65000];
        let n = receiver.recv(&mut buf).await.unwrap();
        let record: Record = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(record.header.dest, 42);
    }
}
