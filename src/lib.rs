//! sluice: A standalone tool for streaming user-created events from Kafka
//! into Cassandra.
//!
//! This library provides components for consuming JSON events from a Kafka
//! topic, projecting them onto a fixed record schema, and inserting them
//! into a Cassandra table that is bootstrapped idempotently at startup.
//!
//! # Example
//!
//! ```ignore
//! use sluice::{Config, run_pipeline, error::PipelineError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PipelineError> {
//!     let config = Config::from_file("config.yaml")?;
//!     let stats = run_pipeline(config).await?;
//!     println!("Inserted {} records", stats.records_inserted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dlq;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod source;

// Re-export main types
pub use config::Config;
pub use pipeline::{Pipeline, PipelineStats, run_pipeline};
pub use schema::UserRecord;
