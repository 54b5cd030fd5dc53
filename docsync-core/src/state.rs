//! # Run State Machine
//!
//! ```text
//! Idle → Planning → CommittingBatch(0) → … → CommittingBatch(last) → Completed
//!           │                 │
//!           └→ Completed      └→ Failed
//!              (no batches)
//! ```
//!
//! [`SyncState`] carries the phase together with the run counters. It has a
//! single owner (the orchestrator) and is discarded when the run ends.

use std::fmt;

use serde::Serialize;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Planning,
    /// Committing the batch at this 0-based index.
    CommittingBatch(usize),
    Completed,
    Failed,
}

impl SyncPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Completed | SyncPhase::Failed)
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Idle => write!(f, "idle"),
            SyncPhase::Planning => write!(f, "planning"),
            SyncPhase::CommittingBatch(i) => write!(f, "committing_batch({i})"),
            SyncPhase::Completed => write!(f, "completed"),
            SyncPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Counters of one run plus its current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub phase: SyncPhase,
    pub total_records: usize,
    /// Known once planning is done.
    pub total_batches: usize,
    pub annotated_count: usize,
    /// Records durably committed.
    pub processed_count: usize,
    pub batches_committed: usize,
    pub current_batch_index: Option<usize>,
}

impl SyncState {
    pub fn new(total_records: usize) -> Self {
        Self {
            phase: SyncPhase::Idle,
            total_records,
            total_batches: 0,
            annotated_count: 0,
            processed_count: 0,
            batches_committed: 0,
            current_batch_index: None,
        }
    }

    /// Index of the last batch that committed, if any did.
    pub fn last_committed_batch(&self) -> Option<usize> {
        self.batches_committed.checked_sub(1)
    }

    fn allows(&self, next: SyncPhase) -> bool {
        use SyncPhase::*;
        match (self.phase, next) {
            (Idle, Planning) => true,
            (Planning, CommittingBatch(0)) => self.total_batches > 0,
            (Planning, Completed) => self.total_batches == 0,
            (CommittingBatch(i), CommittingBatch(j)) => j == i + 1 && j < self.total_batches,
            (CommittingBatch(i), Completed) => i + 1 == self.total_batches,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next`, rejecting transitions outside the run state machine.
    pub fn transition(&mut self, next: SyncPhase) -> Result<(), SyncError> {
        if !self.allows(next) {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        if let SyncPhase::CommittingBatch(i) = next {
            self.current_batch_index = Some(i);
        }
        self.phase = next;
        Ok(())
    }

    pub(crate) fn record_annotated(&mut self) {
        self.annotated_count += 1;
    }

    pub(crate) fn batch_committed(&mut self, batch_size: usize) {
        self.processed_count += batch_size;
        self.batches_committed += 1;
    }

    /// Force the terminal failed phase, whatever the current phase is.
    pub(crate) fn halt(&mut self) {
        self.phase = SyncPhase::Failed;
    }
}
