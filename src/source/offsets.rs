//! Per-partition offset tracking for explicit commits.
//!
//! Auto-commit is disabled on the consumer; the pipeline records the offset
//! of every handled event here and commits the tracked positions on an
//! interval and at shutdown.

use rdkafka::error::KafkaError;
use rdkafka::{Offset, TopicPartitionList};
use std::collections::HashMap;

/// Tracks the highest handled offset per (topic, partition).
#[derive(Debug, Default)]
pub struct OffsetTracker {
    positions: HashMap<(String, i32), i64>,
    dirty: bool,
}

impl OffsetTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handled offset, keeping the maximum per partition.
    pub fn update(&mut self, topic: &str, partition: i32, offset: i64) {
        let entry = self
            .positions
            .entry((topic.to_string(), partition))
            .or_insert(offset);
        if offset > *entry {
            *entry = offset;
        }
        self.dirty = true;
    }

    /// Number of partitions with a tracked position.
    pub fn partition_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether anything changed since the last commit.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the current positions as committed.
    pub fn mark_committed(&mut self) {
        self.dirty = false;
    }

    /// Convert tracked positions to a commit list.
    ///
    /// Kafka commit semantics are "next offset to read", so each position
    /// is advanced by one.
    pub fn to_topic_partition_list(&self) -> Result<TopicPartitionList, KafkaError> {
        let mut tpl = TopicPartitionList::new();
        for ((topic, partition), offset) in &self.positions {
            tpl.add_partition_offset(topic, *partition, Offset::Offset(offset + 1))?;
        }
        Ok(tpl)
    }
}
