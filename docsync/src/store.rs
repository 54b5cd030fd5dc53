#![doc = "Firestore integration: the core DocumentStore contract over the Firestore REST API."]
//
//! # Firestore store (CLI <-> Core)
//!
//! [`FirestoreClient`] turns a core [`WriteBatch`] into one call to the
//! Firestore `documents:commit` endpoint. A commit request is applied
//! atomically by Firestore and accepts at most 500 writes, which matches the
//! default write limit of [`docsync_core::config::SyncConfig`].
//!
//! - Every upsert becomes an `update` write without an update mask, so the
//!   stored document is replaced wholesale (create-or-replace by id).
//! - JSON field values are encoded as Firestore `Value`s by [`to_firestore_value`].
//! - Authentication is a web API key (`?key=`), a bearer access token, or both.
//!
//! See core's [`contract`](docsync_core::contract) module for the trait contract.

use std::time::Duration;

use async_trait::async_trait;
use docsync_core::contract::{DocumentStore, WriteBatch};
use docsync_core::error::StoreError;
use docsync_core::record::Fields;
use serde_json::{json, Map, Value};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for one Firestore database.
#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

pub struct FirestoreClient {
    http: reqwest::Client,
    settings: FirestoreSettings,
}

impl FirestoreClient {
    pub fn new(settings: FirestoreSettings) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        tracing::info!(
            project_id = %settings.project_id,
            database = %settings.database,
            api_key_set = settings.api_key.is_some(),
            access_token_set = settings.access_token.is_some(),
            "Initialized FirestoreClient"
        );
        Ok(Self { http, settings })
    }

    pub fn project_id(&self) -> &str {
        &self.settings.project_id
    }

    fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.settings.project_id, self.settings.database
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/v1/{}/documents:commit",
            self.settings.base_url.trim_end_matches('/'),
            self.database_path()
        )
    }

    /// Request body for committing `batch` into `collection`.
    pub fn commit_body(&self, collection: &str, batch: &WriteBatch) -> Value {
        let database = self.database_path();
        let writes: Vec<Value> = batch
            .writes()
            .iter()
            .map(|upsert| {
                json!({
                    "update": {
                        "name": format!("{database}/documents/{collection}/{}", upsert.id),
                        "fields": to_firestore_fields(&upsert.fields),
                    }
                })
            })
            .collect();
        json!({ "writes": writes })
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn commit(&self, collection: &str, batch: WriteBatch) -> Result<(), StoreError> {
        tracing::info!(
            collection,
            writes = batch.len(),
            "Committing write batch to Firestore"
        );
        let mut request = self
            .http
            .post(self.commit_url())
            .json(&self.commit_body(collection, &batch));
        if let Some(key) = &self.settings.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = ?e, collection, "Firestore commit request failed");
            e
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(collection, %status, "Firestore commit accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
            .unwrap_or(body);
        tracing::error!(collection, %status, message = %message, "Firestore rejected commit");
        Err(format!("Firestore commit failed with {status}: {message}").into())
    }
}

/// Encode a document field map as Firestore `fields`.
pub fn to_firestore_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect();
    Value::Object(encoded)
}

/// Encode one JSON value as a Firestore `Value`.
///
/// Integers that fit in `i64` become `integerValue` (string-encoded, as the
/// REST API expects); every other number becomes `doubleValue`.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}
