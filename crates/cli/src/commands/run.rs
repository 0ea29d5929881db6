//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        sources = blueprint.sources.len(),
        sinks = blueprint.sinks.len(),
        expected_records = ?blueprint.expected_records(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // CLI metrics port overrides the blueprint setting
    let metrics_port = if args.metrics_port != 0 {
        Some(args.metrics_port)
    } else {
        blueprint.relay.metrics_port
    };

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_records: if args.max_records == 0 {
            None
        } else {
            Some(args.max_records)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port,
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        records_ingested = stats.records_ingested,
                        records_dispatched = stats.records_dispatched,
                        duration_secs = stats.duration.as_secs_f64(),
                        rps = format!("{:.2}", stats.rps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Frame Relay finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Relay:");
    println!("  Queue warn depth: {}", blueprint.relay.queue_warn_depth);
    match blueprint.relay.metrics_port {
        Some(port) => println!("  Metrics port: {}", port),
        None => println!("  Metrics port: disabled"),
    }

    println!("\nSources ({}):", blueprint.sources.len());
    for source in &blueprint.sources {
        let count = if source.record_count == 0 {
            "unlimited".to_string()
        } else {
            source.record_count.to_string()
        };
        println!(
            "  - {} ({} Hz, {} records, {} B payload)",
            source.id, source.frequency_hz, count, source.payload_bytes
        );
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
