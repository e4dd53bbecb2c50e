//! Configuration parsing and validation.
//!
//! Handles loading configuration from YAML files with environment variable
//! interpolation, and converts the source section to an rdkafka client
//! configuration.

mod vars;

use rdkafka::ClientConfig;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{
    ConfigError, EmptyBrokersSnafu, EmptyHostsSnafu, EmptyKeyspaceSnafu, EmptyTableSnafu,
    EmptyTopicSnafu, EnvInterpolationSnafu, InvalidReplicationFactorSnafu, ReadFileSnafu,
    YamlParseSnafu,
};

/// Main configuration structure for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Kafka source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// Cassandra sink configuration.
    #[serde(default)]
    pub sink: SinkConfig,
    /// Ingest configuration (streaming write path, disabled by default).
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Metrics configuration (optional, enabled by default).
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Error handling configuration (optional).
    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,
}

/// Source configuration for consuming from Kafka.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Kafka broker addresses (comma-separated).
    #[serde(default = "default_brokers")]
    pub brokers: String,

    /// Topic carrying user-created events.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Consumer group id.
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Where to start when no committed offset exists.
    #[serde(default)]
    pub offset_reset: OffsetReset,

    /// Interval in seconds between offset commits (default: 5).
    #[serde(default = "default_commit_interval_secs")]
    pub commit_interval_secs: u64,

    /// Additional rdkafka client properties (pass-through).
    #[serde(default)]
    pub kafka_properties: HashMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            topic: default_topic(),
            group_id: default_group_id(),
            offset_reset: OffsetReset::default(),
            commit_interval_secs: default_commit_interval_secs(),
            kafka_properties: HashMap::new(),
        }
    }
}

fn default_brokers() -> String {
    "broker:29092".to_string()
}

fn default_topic() -> String {
    "users_created".to_string()
}

fn default_group_id() -> String {
    "sluice-users".to_string()
}

fn default_commit_interval_secs() -> u64 {
    5
}

/// Offset reset policy when the consumer group has no committed position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OffsetReset {
    #[default]
    Earliest,
    Latest,
}

impl OffsetReset {
    /// Returns the rdkafka configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

impl SourceConfig {
    /// Build an rdkafka [`ClientConfig`] from this configuration.
    ///
    /// Auto-commit is disabled: offsets are committed explicitly after the
    /// corresponding events have been handled. Pass-through properties can
    /// override any of the defaults.
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();

        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", self.offset_reset.as_str())
            .set("enable.auto.commit", "false");

        for (key, value) in &self.kafka_properties {
            config.set(key, value);
        }

        config
    }
}

/// Sink configuration for writing to Cassandra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Cassandra contact points.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// CQL native protocol port (default: 9042).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Keyspace holding the user table.
    #[serde(default = "default_keyspace")]
    pub keyspace: String,

    /// Table receiving user records.
    #[serde(default = "default_table")]
    pub table: String,

    /// SimpleStrategy replication factor for the keyspace.
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            port: default_port(),
            keyspace: default_keyspace(),
            table: default_table(),
            replication_factor: default_replication_factor(),
        }
    }
}

fn default_hosts() -> Vec<String> {
    vec!["localhost".to_string()]
}

fn default_port() -> u16 {
    9042
}

fn default_keyspace() -> String {
    "spark_streams".to_string()
}

fn default_table() -> String {
    "created_users".to_string()
}

fn default_replication_factor() -> u32 {
    1
}

impl SinkConfig {
    /// Contact points as `host:port` node addresses.
    pub fn nodes(&self) -> Vec<String> {
        self.hosts
            .iter()
            .map(|h| format!("{}:{}", h, self.port))
            .collect()
    }
}

/// Ingest configuration for the streaming write path.
///
/// Disabled by default: the service performs setup and schema bootstrap,
/// then exits. Enable to consume the topic and insert records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Metrics configuration for the Prometheus endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    /// Address to bind the metrics HTTP server (default: "0.0.0.0:9090").
    #[serde(default = "default_metrics_address")]
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            address: default_metrics_address(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_address() -> String {
    "0.0.0.0:9090".to_string()
}

/// Error handling configuration for resilient pipeline execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    /// Maximum failures before stopping the pipeline (0 = unlimited, default: 0).
    #[serde(default)]
    pub max_failures: usize,
    /// Directory for failed event records (required for DLQ).
    #[serde(default)]
    pub dlq_path: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_options(path, true)
    }

    /// Load configuration from a YAML file with optional environment variable interpolation.
    pub fn from_file_with_options(
        path: impl AsRef<Path>,
        interpolate_env: bool,
    ) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).context(ReadFileSnafu)?;

        let content = if interpolate_env {
            let result = vars::interpolate(&content);
            if !result.is_ok() {
                let error_msg = result.errors.join("\n");
                return EnvInterpolationSnafu { message: error_msg }.fail();
            }
            result.text
        } else {
            content
        };

        let config: Config = serde_yaml::from_str(&content).context(YamlParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.source.brokers.is_empty(), EmptyBrokersSnafu);
        ensure!(!self.source.topic.is_empty(), EmptyTopicSnafu);
        ensure!(!self.sink.hosts.is_empty(), EmptyHostsSnafu);
        ensure!(!self.sink.keyspace.is_empty(), EmptyKeyspaceSnafu);
        ensure!(!self.sink.table.is_empty(), EmptyTableSnafu);
        ensure!(
            self.sink.replication_factor >= 1,
            InvalidReplicationFactorSnafu {
                factor: self.sink.replication_factor
            }
        );
        Ok(())
    }
}
