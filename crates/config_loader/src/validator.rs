//! 配置校验模块
//!
//! 校验规则：
//! - source id 唯一且非空
//! - frequency_hz > 0
//! - sink 名称唯一且非空
//! - file sink 必须带 path 参数，network sink 必须带 addr 参数
//! - queue_warn_depth > 0

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint, SinkType};

/// 校验 RelayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_relay_settings(blueprint)?;
    validate_sources(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验中继运行参数
fn validate_relay_settings(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.relay.queue_warn_depth == 0 {
        return Err(ContractError::config_validation(
            "relay.queue_warn_depth",
            "queue_warn_depth must be > 0",
        ));
    }
    Ok(())
}

/// 校验 source 定义
fn validate_sources(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, source) in blueprint.sources.iter().enumerate() {
        if source.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("sources[{idx}].id"),
                "source id cannot be empty",
            ));
        }
        if !seen.insert(&source.id) {
            return Err(ContractError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }
        if source.frequency_hz <= 0.0 {
            return Err(ContractError::config_validation(
                format!("sources[{}].frequency_hz", source.id),
                format!("frequency_hz must be > 0, got {}", source.frequency_hz),
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }

        let required_param = match sink.sink_type {
            SinkType::File => Some("path"),
            SinkType::Network => Some("addr"),
            SinkType::Log => None,
        };
        if let Some(param) = required_param {
            if !sink.params.contains_key(param) {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.{param}", sink.name),
                    format!("missing required '{param}' parameter"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, RelaySettings, SinkConfig, SourceConfig};
    use std::collections::HashMap;

    fn minimal_blueprint() -> RelayBlueprint {
        RelayBlueprint {
            version: ConfigVersion::V1,
            relay: RelaySettings::default(),
            sources: vec![SourceConfig {
                id: "sender_a".into(),
                frequency_hz: 100.0,
                record_count: 10,
                payload_bytes: 64,
                command: 0,
            }],
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_duplicate_source_id() {
        let mut bp = minimal_blueprint();
        bp.sources.push(bp.sources[0].clone());
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate source id"), "got: {err}");
    }

    #[test]
    fn test_empty_source_id() {
        let mut bp = minimal_blueprint();
        bp.sources[0].id = String::new();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_invalid_frequency() {
        let mut bp = minimal_blueprint();
        bp.sources[0].frequency_hz = -5.0;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("frequency_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_file_sink_requires_path() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].sink_type = SinkType::File;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("'path'"), "got: {err}");
    }

    #[test]
    fn test_network_sink_requires_addr() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].sink_type = SinkType::Network;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("'addr'"), "got: {err}");
    }

    #[test]
    fn test_zero_warn_depth() {
        let mut bp = minimal_blueprint();
        bp.relay.queue_warn_depth = 0;
        assert!(validate(&bp).is_err());
    }
}
