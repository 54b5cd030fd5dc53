/// `load_config` module: merges an optional YAML config file with the environment
/// into the typed CLI config.
///
/// This is the only place where YAML and environment variables are read.
///
/// # Resolution order
/// - Collection: `DOCSYNC_COLLECTION`, then `VITE_TOPICS_COLLECTION`, then the
///   file's `collection`, then `topics`.
/// - Batch write limit: the file's `max_writes_per_batch`, then 500.
/// - Firestore project: `FIRESTORE_PROJECT_ID` (or `VITE_FIREBASE_PROJECT_ID`),
///   then the file's `firestore.project_id`.
/// - Secrets only ever come from the environment: `FIRESTORE_API_KEY` (or
///   `VITE_FIREBASE_API_KEY`) and `FIRESTORE_ACCESS_TOKEN`.
///
/// # Errors
/// All errors use `anyhow::Error`; invalid settings wrap a core
/// [`SyncError::Configuration`] so callers can tell them apart.
use anyhow::{Context, Result};
use docsync_core::config::{SyncConfig, DEFAULT_COLLECTION, DEFAULT_MAX_WRITES_PER_BATCH};
use docsync_core::SyncError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::store::{FirestoreSettings, DEFAULT_BASE_URL, DEFAULT_DATABASE};

pub const DEFAULT_RECORDS_PATH: &str = "topics.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub collection: Option<String>,
    pub max_writes_per_batch: Option<usize>,
    pub records: Option<PathBuf>,
    #[serde(default)]
    pub firestore: FirestoreSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirestoreSection {
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully merged configuration for one CLI invocation.
#[derive(Debug)]
pub struct CliConfig {
    pub sync: SyncConfig,
    pub records: PathBuf,
    pub firestore: FirestoreSection,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl CliConfig {
    /// Firestore connection settings, failing with every missing key listed at once.
    pub fn firestore_settings(&self) -> Result<FirestoreSettings, SyncError> {
        let mut missing = Vec::new();
        if self.firestore.project_id.is_none() {
            missing.push("FIRESTORE_PROJECT_ID");
        }
        if self.api_key.is_none() && self.access_token.is_none() {
            missing.push("FIRESTORE_API_KEY (or FIRESTORE_ACCESS_TOKEN)");
        }
        let project_id = match (&self.firestore.project_id, missing.is_empty()) {
            (Some(project_id), true) => project_id.clone(),
            _ => {
                error!(missing = ?missing, "Missing Firestore configuration keys");
                return Err(SyncError::Configuration(format!(
                    "missing Firestore configuration keys: {}",
                    missing.join(", ")
                )));
            }
        };

        Ok(FirestoreSettings {
            project_id,
            database: self
                .firestore
                .database
                .clone()
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            base_url: self
                .firestore
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: self.api_key.clone(),
            access_token: self.access_token.clone(),
            timeout: Duration::from_secs(
                self.firestore
                    .timeout_secs
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

fn env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let config_content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };

    // An empty file is an empty mapping.
    if config_content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Loads the optional YAML config file and merges environment values into it.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let file = match path {
        Some(path) => read_file_config(path)?,
        None => {
            info!("No config file given, using environment and defaults");
            FileConfig::default()
        }
    };

    let collection = env_value(&["DOCSYNC_COLLECTION", "VITE_TOPICS_COLLECTION"])
        .or(file.collection)
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
    let max_writes = file
        .max_writes_per_batch
        .unwrap_or(DEFAULT_MAX_WRITES_PER_BATCH);
    let sync = SyncConfig::new(collection, max_writes).context("Invalid sync configuration")?;
    sync.trace_loaded();

    let mut firestore = file.firestore;
    if let Some(project_id) = env_value(&["FIRESTORE_PROJECT_ID", "VITE_FIREBASE_PROJECT_ID"]) {
        firestore.project_id = Some(project_id);
    }

    let config = CliConfig {
        sync,
        records: file
            .records
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORDS_PATH)),
        firestore,
        api_key: env_value(&["FIRESTORE_API_KEY", "VITE_FIREBASE_API_KEY"]),
        access_token: env_value(&["FIRESTORE_ACCESS_TOKEN"]),
    };
    info!(
        collection = %config.sync.collection,
        records = %config.records.display(),
        project_id = ?config.firestore.project_id,
        "Config loaded and merged successfully"
    );
    Ok(config)
}
