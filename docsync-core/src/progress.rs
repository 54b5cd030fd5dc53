//! Progress events emitted while a run proceeds, and the reporters that consume them.
//!
//! Reporters observe only: they cannot fail and the orchestrator never reads
//! anything back from them.

use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A record was annotated and queued into the batch being built.
    RecordAnnotated {
        order: u64,
        annotated_count: usize,
        /// Records durably committed so far.
        processed_count: usize,
        total_count: usize,
        batch_index: usize,
        total_batches: usize,
    },
    BatchCommitted {
        batch_index: usize,
        batch_size: usize,
        processed_count: usize,
        total_count: usize,
        total_batches: usize,
    },
    /// Emitted once after the final batch committed (or immediately for an empty source).
    Summary {
        total_count: usize,
        processed_count: usize,
        batches_committed: usize,
        collection: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: &ProgressEvent) {}
}

pub const DEFAULT_RECORD_LOG_INTERVAL: usize = 10;

/// Writes events to `tracing`.
///
/// Every record event is logged at debug level; an info progress line is
/// written every `record_log_interval` records and for the last record.
#[derive(Debug, Clone, Copy)]
pub struct TracingReporter {
    record_log_interval: usize,
}

impl TracingReporter {
    pub fn new(record_log_interval: usize) -> Self {
        Self {
            record_log_interval: record_log_interval.max(1),
        }
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_LOG_INTERVAL)
    }
}

impl ProgressReporter for TracingReporter {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RecordAnnotated {
                order,
                annotated_count,
                processed_count,
                total_count,
                batch_index,
                total_batches,
            } => {
                debug!(
                    order,
                    annotated_count,
                    processed_count,
                    total_count,
                    batch_index,
                    total_batches,
                    "[SYNC] Record annotated"
                );
                if annotated_count % self.record_log_interval == 0 || annotated_count == total_count
                {
                    info!(
                        annotated_count,
                        processed_count,
                        total_count,
                        "[SYNC] Progress: {processed_count}/{total_count} records processed \
                         ({annotated_count} annotated)"
                    );
                }
            }
            ProgressEvent::BatchCommitted {
                batch_index,
                batch_size,
                processed_count,
                total_count,
                total_batches,
            } => {
                info!(
                    batch_index,
                    batch_size,
                    processed_count,
                    total_count,
                    total_batches,
                    "[SYNC] Batch {}/{} committed ({processed_count}/{total_count} records)",
                    batch_index + 1,
                    total_batches
                );
            }
            ProgressEvent::Summary {
                total_count,
                processed_count,
                batches_committed,
                collection,
            } => {
                info!(
                    total_count,
                    processed_count,
                    batches_committed,
                    collection = %collection,
                    "[SYNC] Synchronisation summary"
                );
            }
        }
    }
}
