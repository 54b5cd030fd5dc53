//! Record sources: a fixed in-memory list, or a JSON array on disk.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use crate::contract::RecordSource;
use crate::error::SyncError;
use crate::record::Record;

/// Serves a list of records held in memory, in list order.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<Record>,
}

impl StaticRecordSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn load(&self) -> Result<Vec<Record>, SyncError> {
        Ok(self.records.clone())
    }
}

/// Reads a JSON array of objects, each with a string `id`.
///
/// The whole object, `id` included, becomes the record's field map, so the
/// stored document keeps its id as a field too.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn load(&self) -> Result<Vec<Record>, SyncError> {
        info!(path = %self.path.display(), "Loading records from JSON file");
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to read records file");
            SyncError::Source(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let records = parse_records(&content)?;
        info!(path = %self.path.display(), count = records.len(), "Records loaded");
        Ok(records)
    }
}

/// Parse a JSON array of objects into records, rejecting entries without a string id.
///
/// Id uniqueness is checked once per run by the orchestrator, see [`validate_ids`].
pub fn parse_records(json: &str) -> Result<Vec<Record>, SyncError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SyncError::Source(format!("records are not valid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(SyncError::Source(
            "records file must contain a JSON array".to_string(),
        ));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => match fields.get("id") {
                Some(Value::String(id)) => Ok(Record::new(id.clone(), fields)),
                _ => Err(SyncError::Source(format!(
                    "record at index {index} has no string \"id\""
                ))),
            },
            _ => Err(SyncError::Source(format!(
                "record at index {index} is not a JSON object"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Every record needs a non-empty id that no other record in the run shares.
pub fn validate_ids(records: &[Record]) -> Result<(), SyncError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            return Err(SyncError::Source(format!(
                "record at index {index} has an empty id"
            )));
        }
        if record.id.contains('/') {
            return Err(SyncError::Source(format!(
                "record id {:?} at index {index} must not contain '/'",
                record.id
            )));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(SyncError::Source(format!(
                "duplicate record id {:?} at index {index}",
                record.id
            )));
        }
    }
    Ok(())
}
