//! DLQ types for failure tracking.
//!
//! Contains the data structures for representing failed events and
//! aggregating failure statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::events::FailureStage;

/// A record representing a failed event in the DLQ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEvent {
    /// Topic the event was consumed from.
    pub topic: String,
    /// Partition within the topic.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
    /// Error message describing the failure.
    pub error: String,
    /// Stage at which the failure occurred.
    pub stage: FailureStage,
    /// Timestamp when the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Statistics about failures by stage.
#[derive(Debug, Clone, Default)]
pub struct FailureStats {
    pub decode: usize,
    pub insert: usize,
}

impl FailureStats {
    /// Increment the count for a specific stage.
    pub fn increment(&mut self, stage: FailureStage) {
        match stage {
            FailureStage::Decode => self.decode += 1,
            FailureStage::Insert => self.insert += 1,
        }
    }

    /// Get total failure count.
    pub fn total(&self) -> usize {
        self.decode + self.insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_stats_increment() {
        let mut stats = FailureStats::default();
        stats.increment(FailureStage::Decode);
        stats.increment(FailureStage::Insert);
        stats.increment(FailureStage::Insert);

        assert_eq!(stats.decode, 1);
        assert_eq!(stats.insert, 2);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_failed_event_serialization() {
        let failed = FailedEvent {
            topic: "users_created".to_string(),
            partition: 2,
            offset: 4711,
            error: "missing field `email`".to_string(),
            stage: FailureStage::Decode,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("users_created"));
        assert!(json.contains("decode"));
        assert!(json.contains("4711"));
    }

    #[test]
    fn test_failed_event_deserialization() {
        let json = r#"{"topic":"users_created","partition":0,"offset":12,"error":"timeout","stage":"insert","timestamp":"2025-06-01T10:30:00Z"}"#;
        let failed: FailedEvent = serde_json::from_str(json).unwrap();

        assert_eq!(failed.topic, "users_created");
        assert_eq!(failed.partition, 0);
        assert_eq!(failed.offset, 12);
        assert!(matches!(failed.stage, FailureStage::Insert));
    }
}
