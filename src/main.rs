//! sluice: Kafka to Cassandra streaming ingestion for user-created events.
//!
//! Reads JSON user events from a Kafka topic, projects them onto a fixed
//! record schema, and writes them into a Cassandra table. The default
//! invocation performs setup and idempotent schema bootstrap only; the
//! streaming write path runs when ingest is enabled.

use clap::Parser;
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sluice::config::Config;
use sluice::error::{AddressParseSnafu, ConfigSnafu, MetricsSnafu, PipelineError};
use sluice::pipeline::run_pipeline;
use sluice::schema::UserRecord;
use sluice::{metrics, sink};

/// Kafka to Cassandra streaming tool.
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Dry run - validate configuration without connecting.
    #[arg(long)]
    dry_run: bool,

    /// Enable the streaming write path (overrides ingest.enabled).
    #[arg(long)]
    ingest: bool,
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("sluice starting");

    // Load or build configuration
    let mut config = build_config(&args)?;
    if args.ingest {
        config.ingest.enabled = true;
    }

    // Initialize metrics if enabled
    if config.metrics.enabled {
        let addr = config.metrics.address.parse().context(AddressParseSnafu)?;
        metrics::init(addr).context(MetricsSnafu)?;
        debug!(
            "Metrics endpoint listening on http://{}/metrics",
            config.metrics.address
        );
    }

    if args.dry_run {
        info!("Dry run mode - validating configuration");
        info!("Source: {} (topic {})", config.source.brokers, config.source.topic);
        info!(
            "Sink: {:?} keyspace {} table {}",
            config.sink.hosts, config.sink.keyspace, config.sink.table
        );
        info!("Ingest enabled: {}", config.ingest.enabled);
        info!("Projected columns: {}", UserRecord::COLUMNS.len());
        for column in UserRecord::COLUMNS {
            info!("  - {}", column);
        }
        debug!(
            "Keyspace DDL: {}",
            sink::statements::create_keyspace(&config.sink.keyspace, config.sink.replication_factor)
        );
        info!("Configuration is valid");
        return Ok(());
    }

    // Run the pipeline
    let stats = run_pipeline(config).await?;

    info!("Pipeline completed successfully");
    info!("  Events consumed: {}", stats.events_consumed);
    info!("  Records projected: {}", stats.records_projected);
    info!("  Records inserted: {}", stats.records_inserted);
    info!("  Events failed: {}", stats.events_failed);
    info!("  Offset commits: {}", stats.offsets_committed);

    Ok(())
}

/// Build configuration from arguments.
fn build_config(args: &Args) -> Result<Config, PipelineError> {
    match &args.config {
        Some(path) => Config::from_file(path).context(ConfigSnafu),
        None => Ok(Config::default()),
    }
}
