//! Applies one planned batch to the document store as a single atomic write.

use std::num::NonZeroUsize;

use tracing::{debug, error, info};

use crate::contract::{DocumentStore, WriteBatch};
use crate::error::SyncError;
use crate::planner::Batch;
use crate::record::AnnotatedRecord;

/// Outcome of committing one batch.
pub type CommitResult = Result<(), SyncError>;

pub struct BatchCommitter<'a, S: ?Sized> {
    store: &'a S,
    collection: &'a str,
    max_writes: NonZeroUsize,
}

impl<'a, S> BatchCommitter<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: &'a S, collection: &'a str, max_writes: NonZeroUsize) -> Self {
        Self {
            store,
            collection,
            max_writes,
        }
    }

    /// Upsert every record of `batch` in one store commit. No retries: a store
    /// failure is returned as [`SyncError::BatchCommit`] for the caller to act on.
    pub async fn commit(&self, batch: &Batch<AnnotatedRecord>) -> CommitResult {
        let limit = self.max_writes.get();
        if batch.len() > limit {
            error!(
                batch_index = batch.index,
                size = batch.len(),
                limit,
                "[SYNC][INVARIANT] Planned batch exceeds the write limit, refusing to commit"
            );
            return Err(SyncError::InvariantViolation {
                batch_index: batch.index,
                size: batch.len(),
                limit,
            });
        }

        let mut writes = WriteBatch::begin(self.max_writes);
        for record in &batch.items {
            writes
                .upsert(record.id(), record.to_document())
                .map_err(|full| SyncError::InvariantViolation {
                    batch_index: batch.index,
                    size: batch.len(),
                    limit: full.limit,
                })?;
        }
        debug!(
            batch_index = batch.index,
            writes = writes.len(),
            collection = self.collection,
            "[SYNC][COMMIT] Write batch assembled"
        );

        match self.store.commit(self.collection, writes).await {
            Ok(()) => {
                info!(
                    batch_index = batch.index,
                    size = batch.len(),
                    collection = self.collection,
                    "[SYNC][COMMIT] Batch committed"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    batch_index = batch.index,
                    error = %e,
                    collection = self.collection,
                    "[SYNC][ERROR][COMMIT] Store rejected batch"
                );
                Err(SyncError::BatchCommit {
                    batch_index: batch.index,
                    source: e,
                })
            }
        }
    }
}
