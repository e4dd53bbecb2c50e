//! Main processing pipeline.
//!
//! Sequences the setup factories the way the deployment expects: the queue
//! reader must come up first, then the Cassandra session, then the
//! idempotent schema bootstrap. The streaming write path only runs when
//! ingest is enabled; the default invocation stops after bootstrap.

mod signal;

use snafu::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::dlq::{DeadLetterQueue, FailureTracker};
use crate::emit;
use crate::error::{DlqSnafu, PipelineError, SinkSnafu, SourceSnafu};
use crate::metrics::events::{
    BytesConsumed, EventSkipped, EventsConsumed, FailureStage, InsertCompleted, OffsetsCommitted,
    RecordsInserted, RecordsProjected,
};
use crate::schema;
use crate::sink::CassandraSink;
use crate::source::{KafkaReader, OffsetTracker, RawEvent};

/// Statistics about the pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub events_consumed: usize,
    pub records_projected: usize,
    pub records_inserted: usize,
    pub events_failed: usize,
    pub offsets_committed: usize,
}

/// Main processing pipeline.
pub struct Pipeline {
    config: Config,
    stats: PipelineStats,
    shutdown: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline from configuration.
    pub fn new(config: Config, shutdown: CancellationToken) -> Self {
        Self {
            config,
            stats: PipelineStats::default(),
            shutdown,
        }
    }

    /// Run the pipeline.
    ///
    /// Setup order is fixed: Kafka reader, Cassandra session, schema
    /// bootstrap. Any setup failure is fatal. When ingest is disabled the
    /// run ends after bootstrap.
    pub async fn run(&mut self) -> Result<PipelineStats, PipelineError> {
        info!("Starting pipeline");

        let reader = KafkaReader::connect(&self.config.source).context(SourceSnafu)?;

        let mut sink = CassandraSink::connect(&self.config.sink)
            .await
            .context(SinkSnafu)?;
        sink.bootstrap().await.context(SinkSnafu)?;

        if !self.config.ingest.enabled {
            info!("Streaming write path disabled; setup and schema bootstrap complete");
            info!("Run with --ingest (or ingest.enabled) to start consumption");
            return Ok(self.stats.clone());
        }

        self.ingest(reader, sink).await
    }

    /// Consume the topic and insert projected records until shutdown.
    async fn ingest(
        &mut self,
        reader: KafkaReader,
        sink: CassandraSink,
    ) -> Result<PipelineStats, PipelineError> {
        let dlq = DeadLetterQueue::from_config(&self.config.error_handling)
            .await
            .context(DlqSnafu)?
            .map(Arc::new);
        let mut failures = FailureTracker::new(self.config.error_handling.max_failures, dlq);
        let mut offsets = OffsetTracker::new();

        let mut commit_ticker =
            tokio::time::interval(Duration::from_secs(self.config.source.commit_interval_secs));
        commit_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Streaming {} into {}.{}",
            reader.topic(),
            sink.keyspace(),
            sink.table()
        );

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping ingest");
                    break;
                }

                _ = commit_ticker.tick() => {
                    self.commit_offsets(&reader, &mut offsets);
                }

                received = reader.recv() => match received {
                    Ok(Some(event)) => {
                        self.handle_event(event, &sink, &mut offsets, &mut failures).await?;
                    }
                    Ok(None) => {
                        emit!(EventSkipped);
                    }
                    Err(e) => {
                        // Transient broker errors surface here; keep consuming
                        warn!("Kafka receive error: {}", e);
                    }
                }
            }
        }

        self.commit_offsets(&reader, &mut offsets);
        failures.finalize_dlq().await;

        if failures.has_failures() {
            warn!(
                "Ingest stopped with {} failures (recorded to DLQ if configured)",
                failures.count()
            );
        }

        info!("Pipeline completed: {:?}", self.stats);
        Ok(self.stats.clone())
    }

    /// Project one event and insert it, advancing the offset either way.
    ///
    /// Decode and insert failures are counted and recorded; the event is
    /// dropped and its offset still advances (no retry, no dead-letter
    /// replay in-band).
    async fn handle_event(
        &mut self,
        event: RawEvent,
        sink: &CassandraSink,
        offsets: &mut OffsetTracker,
        failures: &mut FailureTracker,
    ) -> Result<(), PipelineError> {
        self.stats.events_consumed += 1;
        emit!(EventsConsumed { count: 1 });
        emit!(BytesConsumed {
            bytes: event.payload.len() as u64
        });

        match schema::project(&event.payload) {
            Ok(record) => {
                self.stats.records_projected += 1;
                emit!(RecordsProjected { count: 1 });

                let start = Instant::now();
                match sink.insert(&record).await {
                    Ok(()) => {
                        self.stats.records_inserted += 1;
                        emit!(RecordsInserted { count: 1 });
                        emit!(InsertCompleted {
                            duration: start.elapsed()
                        });
                    }
                    Err(e) => {
                        warn!("Could not insert data: {}", e);
                        self.stats.events_failed += 1;
                        failures
                            .record_failure(&event, &e.to_string(), FailureStage::Insert)
                            .await?;
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Dropping undecodable event at {}/{}@{}: {}",
                    event.topic, event.partition, event.offset, e
                );
                self.stats.events_failed += 1;
                failures
                    .record_failure(&event, &e.to_string(), FailureStage::Decode)
                    .await?;
            }
        }

        offsets.update(&event.topic, event.partition, event.offset);
        Ok(())
    }

    /// Commit tracked offsets if anything changed since the last commit.
    fn commit_offsets(&mut self, reader: &KafkaReader, offsets: &mut OffsetTracker) {
        if !offsets.is_dirty() {
            return;
        }
        match reader.commit(offsets) {
            Ok(()) => {
                offsets.mark_committed();
                self.stats.offsets_committed += 1;
                emit!(OffsetsCommitted {
                    partitions: offsets.partition_count()
                });
            }
            Err(e) => {
                // A later commit retries the same positions
                warn!("Offset commit failed: {}", e);
            }
        }
    }
}

/// Run the pipeline with the given configuration.
pub async fn run_pipeline(config: Config) -> Result<PipelineStats, PipelineError> {
    let shutdown = CancellationToken::new();

    // Set up signal handler for graceful shutdown
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signal::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let mut pipeline = Pipeline::new(config, shutdown);
    pipeline.run().await
}
