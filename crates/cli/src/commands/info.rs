//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    relay: RelayInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<SourceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct RelayInfo {
    queue_warn_depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_records: Option<u64>,
}

#[derive(Serialize)]
struct SourceInfo {
    id: String,
    frequency_hz: f64,
    record_count: u64,
    payload_bytes: usize,
    command: u32,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sources = if args.sources {
        blueprint
            .sources
            .iter()
            .map(|s| SourceInfo {
                id: s.id.clone(),
                frequency_hz: s.frequency_hz,
                record_count: s.record_count,
                payload_bytes: s.payload_bytes,
                command: s.command,
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                params: s.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        relay: RelayInfo {
            queue_warn_depth: blueprint.relay.queue_warn_depth,
            metrics_port: blueprint.relay.metrics_port,
            expected_records: blueprint.expected_records(),
        },
        sources,
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Frame Relay Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Relay settings
    println!("⚙️  Relay");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!(
        "   ├─ Queue warn depth: {}",
        blueprint.relay.queue_warn_depth
    );
    match blueprint.relay.metrics_port {
        Some(port) => println!("   ├─ Metrics port: {}", port),
        None => println!("   ├─ Metrics port: disabled"),
    }
    match blueprint.expected_records() {
        Some(count) => println!("   └─ Expected records: {}", count),
        None => println!("   └─ Expected records: unlimited"),
    }

    // Sources
    println!("\n📨 Sources ({})", blueprint.sources.len());
    for (i, source) in blueprint.sources.iter().enumerate() {
        let is_last = i == blueprint.sources.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.sources {
            println!(
                "   {} {} ({} Hz, {} records, {} B payload, command {})",
                prefix,
                source.id,
                source.frequency_hz,
                source.record_count,
                source.payload_bytes,
                source.command
            );
        } else {
            println!("   {} {} ({} Hz)", prefix, source.id, source.frequency_hz);
        }
    }

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

            if args.sinks && !sink.params.is_empty() {
                let child_prefix = if is_last { "   " } else { "│  " };
                for (key, value) in &sink.params {
                    println!("   {}     {} = {}", child_prefix, key, value);
                }
            }
        }
    }

    println!();
}
