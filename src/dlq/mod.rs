//! Dead Letter Queue for failed event tracking.
//!
//! This module provides functionality for recording and tracking failed
//! events during pipeline execution. Failed events are written as NDJSON
//! to a configurable directory for later inspection and reprocessing.
//!
//! # Components
//!
//! - [`DeadLetterQueue`] - Main DLQ implementation that buffers and writes failures
//! - [`FailureTracker`] - High-level tracker with max_failures enforcement

mod queue;
mod tracker;
mod types;

pub use queue::DeadLetterQueue;
pub use tracker::FailureTracker;
pub use types::{FailedEvent, FailureStats};
