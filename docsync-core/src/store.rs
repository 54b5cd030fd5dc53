//! In-process [`DocumentStore`] used for dry runs and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::contract::{DocumentStore, WriteBatch};
use crate::error::StoreError;
use crate::record::Fields;

#[derive(Debug, Default)]
struct Inner {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
    commit_attempts: usize,
    commits: usize,
    fail_on_attempts: BTreeSet<usize>,
}

/// A map of collections to documents, committed atomically under a mutex.
///
/// Failures can be injected for specific commit attempts (1-based, counted
/// over the store's lifetime) to exercise partial-failure handling.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    write_limit: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any commit holding more than `limit` writes, as a remote store would.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Make the `attempt`-th commit (1-based) fail without applying anything.
    pub fn failing_on_attempt(self, attempt: usize) -> Self {
        self.lock().fail_on_attempts.insert(attempt);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking test thread; the map itself is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Fields> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    /// All documents in `collection`, keyed by id.
    pub fn documents(&self, collection: &str) -> BTreeMap<String, Fields> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    pub fn commit_attempts(&self) -> usize {
        self.lock().commit_attempts
    }

    /// Number of commits that were applied.
    pub fn commits(&self) -> usize {
        self.lock().commits
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn commit(&self, collection: &str, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.commit_attempts += 1;
        let attempt = inner.commit_attempts;

        if inner.fail_on_attempts.contains(&attempt) {
            warn!(attempt, collection, "In-memory store failing commit on request");
            return Err(format!("injected failure on commit attempt {attempt}").into());
        }
        if let Some(limit) = self.write_limit {
            if batch.len() > limit {
                return Err(format!(
                    "commit holds {} writes, store accepts at most {limit}",
                    batch.len()
                )
                .into());
            }
        }

        let writes = batch.len();
        let docs = inner.collections.entry(collection.to_string()).or_default();
        for upsert in batch.into_writes() {
            docs.insert(upsert.id, upsert.fields);
        }
        inner.commits += 1;
        debug!(attempt, writes, collection, "In-memory store applied commit");
        Ok(())
    }
}
