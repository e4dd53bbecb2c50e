//! Dead Letter Queue implementation.
//!
//! Records failed events to a configurable directory for later inspection
//! and reprocessing. Writes failures as NDJSON for easy parsing.

use chrono::Utc;
use snafu::prelude::*;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::ErrorHandlingConfig;
use crate::error::{DlqCreateDirSnafu, DlqError, DlqSerializeSnafu, DlqWriteSnafu};
use crate::metrics::events::FailureStage;

use super::types::{FailedEvent, FailureStats};

/// Dead Letter Queue for recording failed events.
///
/// Buffers failures in memory and flushes them as NDJSON to a per-run file.
pub struct DeadLetterQueue {
    file_path: PathBuf,
    buffer: Mutex<Vec<FailedEvent>>,
    stats: Mutex<FailureStats>,
    buffer_size: usize,
}

impl DeadLetterQueue {
    /// Create a new DLQ from configuration.
    ///
    /// Returns `None` if no DLQ path is configured.
    pub async fn from_config(config: &ErrorHandlingConfig) -> Result<Option<Self>, DlqError> {
        let Some(dlq_path) = &config.dlq_path else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(dlq_path)
            .await
            .context(DlqCreateDirSnafu {
                path: dlq_path.clone(),
            })?;

        // Unique filename per run
        let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
        let file_path = PathBuf::from(dlq_path).join(format!("failures-{}.ndjson", timestamp));

        info!("DLQ enabled: {}", file_path.display());

        Ok(Some(Self {
            file_path,
            buffer: Mutex::new(Vec::new()),
            stats: Mutex::new(FailureStats::default()),
            buffer_size: 100, // Flush every 100 records
        }))
    }

    /// Record an event failure.
    pub async fn record_failure(
        &self,
        topic: &str,
        partition: i32,
        offset: i64,
        error: &str,
        stage: FailureStage,
    ) {
        let failed = FailedEvent {
            topic: topic.to_string(),
            partition,
            offset,
            error: error.to_string(),
            stage,
            timestamp: Utc::now(),
        };

        debug!(
            "Recording DLQ failure: {}/{}@{} at stage {}",
            topic,
            partition,
            offset,
            stage.as_str()
        );

        {
            let mut stats = self.stats.lock().await;
            stats.increment(stage);
        }

        let should_flush = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(failed);
            buffer.len() >= self.buffer_size
        };

        if should_flush && let Err(e) = self.flush().await {
            error!("Failed to flush DLQ: {}", e);
        }
    }

    /// Flush buffered records to the DLQ file.
    pub async fn flush(&self) -> Result<(), DlqError> {
        let records = {
            let mut buffer = self.buffer.lock().await;
            if buffer.is_empty() {
                return Ok(());
            }
            std::mem::take(&mut *buffer)
        };

        let count = records.len();
        debug!("Flushing {} DLQ records", count);

        let mut ndjson = String::new();
        for record in &records {
            let line = serde_json::to_string(record).context(DlqSerializeSnafu)?;
            ndjson.push_str(&line);
            ndjson.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .context(DlqWriteSnafu)?;
        file.write_all(ndjson.as_bytes())
            .await
            .context(DlqWriteSnafu)?;
        file.flush().await.context(DlqWriteSnafu)?;

        info!("Flushed {} records to DLQ", count);
        Ok(())
    }

    /// Finalize the DLQ, flushing any remaining records.
    pub async fn finalize(&self) -> Result<(), DlqError> {
        self.flush().await?;
        let stats = self.stats.lock().await;
        info!(
            "DLQ finalized: {} total failures (decode={}, insert={})",
            stats.total(),
            stats.decode,
            stats.insert
        );
        Ok(())
    }
}
