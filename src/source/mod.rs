//! Kafka queue reader.
//!
//! Wraps an rdkafka `StreamConsumer` subscribed to the user-event topic,
//! yielding raw payloads for projection. Connection failures are logged as
//! warnings and returned to the caller; there is no retry.

mod offsets;

pub use offsets::OffsetTracker;

use bytes::Bytes;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use snafu::prelude::*;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::error::{ConsumerCreateSnafu, OffsetCommitSnafu, ReceiveSnafu, SourceError, SubscribeSnafu};

/// One raw record read from the topic.
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Message payload bytes.
    pub payload: Bytes,
    /// Topic the message came from.
    pub topic: String,
    /// Partition within the topic.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
}

/// Kafka reader producing an unbounded stream of [`RawEvent`]s.
pub struct KafkaReader {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaReader {
    /// Build a consumer and subscribe to the configured topic.
    pub fn connect(config: &SourceConfig) -> Result<Self, SourceError> {
        let client_config = config.to_client_config();

        let consumer: StreamConsumer = match client_config.create() {
            Ok(consumer) => consumer,
            Err(e) => {
                warn!("Kafka consumer not created: {}", e);
                return Err(e).context(ConsumerCreateSnafu);
            }
        };

        if let Err(e) = consumer.subscribe(&[config.topic.as_str()]) {
            warn!("Kafka subscription to {} failed: {}", config.topic, e);
            return Err(e).context(SubscribeSnafu {
                topic: config.topic.clone(),
            });
        }

        info!(
            "Kafka consumer subscribed to {} on {} (offset reset: {})",
            config.topic,
            config.brokers,
            config.offset_reset.as_str()
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }

    /// Receive the next event.
    ///
    /// Returns `None` for messages without a payload (tombstones), which
    /// are skipped by the caller.
    pub async fn recv(&self) -> Result<Option<RawEvent>, SourceError> {
        let message = self.consumer.recv().await.context(ReceiveSnafu)?;

        let Some(payload) = message.payload() else {
            return Ok(None);
        };

        Ok(Some(RawEvent {
            payload: Bytes::copy_from_slice(payload),
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        }))
    }

    /// Commit the tracked positions asynchronously.
    pub fn commit(&self, tracker: &OffsetTracker) -> Result<(), SourceError> {
        let tpl = tracker
            .to_topic_partition_list()
            .context(OffsetCommitSnafu)?;
        self.consumer
            .commit(&tpl, CommitMode::Async)
            .context(OffsetCommitSnafu)
    }

    /// Topic this reader is subscribed to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl std::fmt::Debug for KafkaReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaReader")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
