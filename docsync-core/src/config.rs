use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SyncError;

/// Write cap of one atomic commit in the stores we target (Firestore allows 500).
pub const DEFAULT_MAX_WRITES_PER_BATCH: usize = 500;

pub const DEFAULT_COLLECTION: &str = "topics";

/// Settings for one synchronisation run, passed in explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Destination collection identity.
    pub collection: String,
    #[serde(default = "default_max_writes")]
    pub max_writes_per_batch: NonZeroUsize,
}

fn default_max_writes() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_MAX_WRITES_PER_BATCH).unwrap_or(NonZeroUsize::MIN)
}

impl SyncConfig {
    /// Validates the collection identity and the batch write limit.
    pub fn new(
        collection: impl Into<String>,
        max_writes_per_batch: usize,
    ) -> Result<Self, SyncError> {
        let collection = collection.into();
        let collection = collection.trim();
        if collection.is_empty() {
            return Err(SyncError::Configuration(
                "target collection must not be empty".to_string(),
            ));
        }
        if collection.contains('/') {
            return Err(SyncError::Configuration(format!(
                "target collection {collection:?} must not contain '/'"
            )));
        }
        let max_writes_per_batch = NonZeroUsize::new(max_writes_per_batch).ok_or_else(|| {
            SyncError::Configuration("max_writes_per_batch must be at least 1".to_string())
        })?;
        Ok(Self {
            collection: collection.to_string(),
            max_writes_per_batch,
        })
    }

    /// Config with the default write limit.
    pub fn for_collection(collection: impl Into<String>) -> Result<Self, SyncError> {
        Self::new(collection, DEFAULT_MAX_WRITES_PER_BATCH)
    }

    pub fn trace_loaded(&self) {
        info!(
            collection = %self.collection,
            max_writes_per_batch = self.max_writes_per_batch.get(),
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}
