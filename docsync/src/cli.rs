///
/// This module implements the CLI interface for docsync: command parsing,
/// wiring of the configured store and record source, and user-visible output.
///
/// All synchronisation logic (planning, annotation, commits, run state) lives
/// in the [`docsync-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - From the command line: `docsync sync --records topics.json [--config docsync.yaml] [--dry-run]`.
/// - Programmatically or from integration tests: call [`run`] with a constructed [`Cli`].
///
/// [`docsync-core`]: ../../docsync-core/
use crate::load_config::load_config;
use crate::store::FirestoreClient;
use anyhow::Result;
use clap::{Parser, Subcommand};
use docsync_core::contract::DocumentStore;
use docsync_core::progress::TracingReporter;
use docsync_core::source::JsonFileSource;
use docsync_core::store::InMemoryStore;
use docsync_core::synchronise::synchronise;
use std::path::PathBuf;

/// CLI for docsync: publish an ordered record list into a document collection.
#[derive(Parser)]
#[clap(
    name = "docsync",
    version,
    about = "Synchronise an ordered JSON record list into a Firestore collection in bounded atomic batches"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronise every record into the target collection
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// JSON array of records to synchronise (overrides `records` from the config file)
        #[clap(long)]
        records: Option<PathBuf>,
        /// Write into an in-memory store instead of Firestore
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync {
            config,
            records,
            dry_run,
        } => {
            let config = load_config(config.as_deref())?;
            let records_path = records.unwrap_or_else(|| config.records.clone());
            tracing::info!(
                command = "sync",
                dry_run,
                records = %records_path.display(),
                "Starting synchronisation process"
            );

            let (store, target): (Box<dyn DocumentStore>, String) = if dry_run {
                let store = InMemoryStore::new()
                    .with_write_limit(config.sync.max_writes_per_batch.get());
                (Box::new(store), "in-memory store (dry run)".to_string())
            } else {
                let settings = config.firestore_settings()?;
                let client = FirestoreClient::new(settings)
                    .map_err(|e| anyhow::anyhow!("Failed to construct Firestore client: {e}"))?;
                let target = format!("Firestore project {}", client.project_id());
                (Box::new(client), target)
            };

            let source = JsonFileSource::new(&records_path);
            let reporter = TracingReporter::default();
            println!(
                "Synchronise starting: collection \"{}\" on {target}...",
                config.sync.collection
            );

            match synchronise(&config.sync, &source, store.as_ref(), &reporter).await {
                Ok(report) => {
                    tracing::info!(
                        command = "sync",
                        run_id = %report.run_id,
                        "Synchronisation complete"
                    );
                    println!("Synchronise complete.");
                    println!("  Total records synchronised: {}", report.processed_count());
                    println!("  Batches committed: {}", report.state.batches_committed);
                    println!("  Collection: {}", report.collection);
                    println!("  Target: {target}");
                    Ok(())
                }
                Err(aborted) => {
                    let last_batch = aborted
                        .last_committed_batch()
                        .map_or_else(|| "none".to_string(), |i| (i + 1).to_string());
                    tracing::error!(
                        command = "sync",
                        error = %aborted.error,
                        last_committed_batch = ?aborted.last_committed_batch(),
                        processed_count = aborted.processed_count(),
                        "Synchronisation failed"
                    );
                    eprintln!("[ERROR] Synchronisation failed: {}", aborted.error);
                    eprintln!("  Last committed batch: {last_batch}");
                    eprintln!(
                        "  Records committed: {} of {}",
                        aborted.processed_count(),
                        aborted.state.total_records
                    );
                    eprintln!(
                        "  Records not committed: {}",
                        aborted.state.total_records - aborted.processed_count()
                    );
                    eprintln!(
                        "  Rerun the synchronisation once the cause is fixed; \
                         committed records are overwritten safely."
                    );
                    Err(anyhow::Error::new(aborted))
                }
            }
        }
    }
}
