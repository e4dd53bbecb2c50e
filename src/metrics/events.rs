//! Internal events for metrics emission.
//!
//! Each event struct represents a measurable occurrence in the pipeline.
//! Events implement the `InternalEvent` trait which emits the corresponding
//! Prometheus metric.

use metrics::{counter, histogram};
use std::time::Duration;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Event emitted when events are consumed from the topic.
pub struct EventsConsumed {
    pub count: u64,
}

impl InternalEvent for EventsConsumed {
    fn emit(self) {
        trace!(count = self.count, "Events consumed");
        counter!("sluice_events_consumed_total").increment(self.count);
    }
}

/// Event emitted when payload bytes are read from the topic.
pub struct BytesConsumed {
    pub bytes: u64,
}

impl InternalEvent for BytesConsumed {
    fn emit(self) {
        trace!(bytes = self.bytes, "Bytes consumed");
        counter!("sluice_bytes_consumed_total").increment(self.bytes);
    }
}

/// Event emitted when a payload is projected onto the record schema.
pub struct RecordsProjected {
    pub count: u64,
}

impl InternalEvent for RecordsProjected {
    fn emit(self) {
        trace!(count = self.count, "Records projected");
        counter!("sluice_records_projected_total").increment(self.count);
    }
}

/// Event emitted when a record is inserted into Cassandra.
pub struct RecordsInserted {
    pub count: u64,
}

impl InternalEvent for RecordsInserted {
    fn emit(self) {
        trace!(count = self.count, "Records inserted");
        counter!("sluice_records_inserted_total").increment(self.count);
    }
}

/// Event emitted when a payload without a body is skipped.
pub struct EventSkipped;

impl InternalEvent for EventSkipped {
    fn emit(self) {
        trace!("Event skipped");
        counter!("sluice_events_skipped_total").increment(1);
    }
}

/// Stage at which an event failure occurred.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Decode,
    Insert,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Decode => "decode",
            FailureStage::Insert => "insert",
        }
    }
}

/// Event emitted when an event fails processing.
pub struct EventFailed {
    pub stage: FailureStage,
}

impl InternalEvent for EventFailed {
    fn emit(self) {
        trace!(stage = self.stage.as_str(), "Event failed");
        counter!("sluice_events_failed_total", "stage" => self.stage.as_str()).increment(1);
    }
}

/// Event emitted when an insert completes.
pub struct InsertCompleted {
    pub duration: Duration,
}

impl InternalEvent for InsertCompleted {
    fn emit(self) {
        trace!(duration_ms = self.duration.as_millis(), "Insert completed");
        histogram!("sluice_insert_duration_seconds").record(self.duration.as_secs_f64());
    }
}

/// Event emitted when schema bootstrap completes.
pub struct BootstrapCompleted {
    pub duration: Duration,
}

impl InternalEvent for BootstrapCompleted {
    fn emit(self) {
        trace!(
            duration_ms = self.duration.as_millis(),
            "Schema bootstrap completed"
        );
        histogram!("sluice_bootstrap_duration_seconds").record(self.duration.as_secs_f64());
    }
}

/// Event emitted when consumer offsets are committed.
pub struct OffsetsCommitted {
    pub partitions: usize,
}

impl InternalEvent for OffsetsCommitted {
    fn emit(self) {
        trace!(partitions = self.partitions, "Offsets committed");
        counter!("sluice_offset_commits_total").increment(1);
    }
}
