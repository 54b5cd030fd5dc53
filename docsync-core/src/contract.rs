//! # contract: interfaces to the collaborators around the synchroniser
//!
//! - [`RecordSource`] supplies the ordered records for one run.
//! - [`DocumentStore`] applies a [`WriteBatch`] atomically to a collection.
//!
//! Both traits are annotated for `mockall` so tests can script them; the
//! mocks are exported behind the `test-export-mocks` feature for use from
//! integration tests in dependent crates.
//!
//! ## Adding a new store
//! - Implement [`DocumentStore::commit`] so that either every upsert in the
//!   batch becomes durable or none does.
//! - Report all transport or rejection failures as a boxed [`StoreError`].

use std::num::NonZeroUsize;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use thiserror::Error;

use crate::error::{StoreError, SyncError};
use crate::record::{Fields, Record};

/// One create-or-replace write keyed by document id.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub id: String,
    pub fields: Fields,
}

/// Returned when an upsert would push a [`WriteBatch`] past its limit.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("write batch is full ({limit} writes)")]
pub struct WriteBatchFull {
    pub limit: usize,
}

/// Handle collecting the writes of one atomic commit.
///
/// Mirrors a store-side write batch: open it, add upserts, hand it to
/// [`DocumentStore::commit`]. It never holds more than `limit` writes.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    limit: NonZeroUsize,
    writes: Vec<Upsert>,
}

impl WriteBatch {
    pub fn begin(limit: NonZeroUsize) -> Self {
        Self {
            limit,
            writes: Vec::with_capacity(limit.get()),
        }
    }

    /// Queue an upsert. Fails without modifying the batch once `limit` writes are queued.
    pub fn upsert(&mut self, id: impl Into<String>, fields: Fields) -> Result<(), WriteBatchFull> {
        if self.writes.len() >= self.limit.get() {
            return Err(WriteBatchFull {
                limit: self.limit.get(),
            });
        }
        self.writes.push(Upsert {
            id: id.into(),
            fields,
        });
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Upsert] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Upsert> {
        self.writes
    }
}

/// Supplies the finite, ordered records of one run.
///
/// Loaded exactly once per run; the returned `Vec` fixes the iteration order
/// that `order` metadata is derived from.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Record>, SyncError>;
}

/// A remote document collection store with an atomic write-batch primitive.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply every upsert in `batch` to `collection` as one atomic unit.
    async fn commit(&self, collection: &str, batch: WriteBatch) -> Result<(), StoreError>;
}
