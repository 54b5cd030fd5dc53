use thiserror::Error;

/// Boxed error returned by document store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Record source error: {0}")]
    Source(String),

    #[error("Batch {batch_index} failed to commit: {source}")]
    BatchCommit {
        batch_index: usize,
        #[source]
        source: StoreError,
    },

    #[error("Invariant violated: batch {batch_index} holds {size} writes, limit is {limit}")]
    InvariantViolation {
        batch_index: usize,
        size: usize,
        limit: usize,
    },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl SyncError {
    /// Programming defects, as opposed to failures reported by the store or the environment.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            SyncError::InvariantViolation { .. } | SyncError::InvalidStateTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
