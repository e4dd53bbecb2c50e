//! Error types for sluice using snafu.
//!
//! This module defines structured error types with context selectors for
//! all error conditions in the codebase.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Broker list is empty.
    #[snafu(display("Kafka broker list cannot be empty"))]
    EmptyBrokers,

    /// Topic name is empty.
    #[snafu(display("Kafka topic cannot be empty"))]
    EmptyTopic,

    /// Cassandra host list is empty.
    #[snafu(display("Cassandra host list cannot be empty"))]
    EmptyHosts,

    /// Keyspace name is empty.
    #[snafu(display("Keyspace name cannot be empty"))]
    EmptyKeyspace,

    /// Table name is empty.
    #[snafu(display("Table name cannot be empty"))]
    EmptyTable,

    /// Replication factor below the minimum.
    #[snafu(display("Replication factor must be at least 1, got {factor}"))]
    InvalidReplicationFactor { factor: u32 },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },
}

// ============ Source Errors ============

/// Errors that can occur while consuming from Kafka.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceError {
    /// Failed to build the consumer from its client configuration.
    #[snafu(display("Failed to create Kafka consumer"))]
    ConsumerCreate { source: rdkafka::error::KafkaError },

    /// Failed to subscribe to the topic.
    #[snafu(display("Failed to subscribe to topic {topic}"))]
    Subscribe {
        source: rdkafka::error::KafkaError,
        topic: String,
    },

    /// Consumer receive error.
    #[snafu(display("Kafka receive failed"))]
    Receive { source: rdkafka::error::KafkaError },

    /// Failed to commit consumed offsets.
    #[snafu(display("Failed to commit offsets"))]
    OffsetCommit { source: rdkafka::error::KafkaError },
}

// ============ Projection Errors ============

/// Errors that can occur while projecting a raw payload onto the record schema.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProjectionError {
    /// Payload is not a JSON object matching the schema.
    #[snafu(display("Failed to decode user event: {message}"))]
    Decode { message: String },
}

// ============ Sink Errors ============

/// Errors that can occur during Cassandra operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Failed to open a session against the cluster.
    #[snafu(display("Failed to create Cassandra session"))]
    SessionCreate {
        source: scylla::transport::errors::NewSessionError,
    },

    /// Keyspace DDL failed.
    #[snafu(display("Failed to create keyspace {keyspace}"))]
    CreateKeyspace {
        source: scylla::transport::errors::QueryError,
        keyspace: String,
    },

    /// Table DDL failed.
    #[snafu(display("Failed to create table {table}"))]
    CreateTable {
        source: scylla::transport::errors::QueryError,
        table: String,
    },

    /// Insert statement preparation failed.
    #[snafu(display("Failed to prepare insert statement"))]
    PrepareInsert {
        source: scylla::transport::errors::QueryError,
    },

    /// Insert execution failed.
    #[snafu(display("Failed to insert record {id}"))]
    Insert {
        source: scylla::transport::errors::QueryError,
        id: uuid::Uuid,
    },

    /// Insert attempted before schema bootstrap.
    #[snafu(display("Sink is not bootstrapped: insert statement not prepared"))]
    NotBootstrapped,
}

// ============ Metrics Errors ============

/// Errors that can occur during metrics initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to initialize Prometheus recorder.
    #[snafu(display("Failed to initialize Prometheus recorder"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },
}

// ============ DLQ Errors ============

/// Errors that can occur during Dead Letter Queue operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
// Prefix is intentional to avoid snafu selector conflicts (e.g., WriteSnafu)
#[allow(clippy::enum_variant_names)]
pub enum DlqError {
    /// Failed to create the DLQ directory.
    #[snafu(display("Failed to create DLQ directory {path}"))]
    DlqCreateDir {
        source: std::io::Error,
        path: String,
    },

    /// Failed to write to the DLQ file.
    #[snafu(display("Failed to write to DLQ"))]
    DlqWrite { source: std::io::Error },

    /// Failed to serialize a failed event record.
    #[snafu(display("Failed to serialize DLQ record"))]
    DlqSerialize { source: serde_json::Error },
}

// ============ Pipeline Error (top-level) ============

/// Top-level pipeline errors that aggregate all error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Kafka source error.
    #[snafu(display("Source error"))]
    Source { source: SourceError },

    /// Cassandra sink error.
    #[snafu(display("Sink error"))]
    Sink { source: SinkError },

    /// Metrics error.
    #[snafu(display("Metrics error"))]
    Metrics { source: MetricsError },

    /// DLQ error.
    #[snafu(display("DLQ error"))]
    Dlq { source: DlqError },

    /// Address parsing error.
    #[snafu(display("Failed to parse address"))]
    AddressParse { source: std::net::AddrParseError },

    /// Max failures exceeded.
    #[snafu(display("Max failures exceeded: {count} failures"))]
    MaxFailuresExceeded { count: usize },
}
