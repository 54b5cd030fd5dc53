//! High-level pipeline: load records → plan batches → annotate → commit, one batch at a time.
//!
//! This module drives a full synchronisation run of an ordered record list into
//! one collection of a [`DocumentStore`]:
//!   - Plans `ceil(N / M)` order-preserving batches, M being the configured write cap
//!   - Annotates each record with `order`, `createdAt` and `updatedAt`
//!   - Commits each batch atomically and waits for it before starting the next
//!   - Reports progress to a [`ProgressReporter`] and returns a report or the failure state
//!
//! # Major Types
//! - [`SyncOrchestrator`]: runs the state machine of [`crate::state`] over a record slice
//! - [`SynchroniseReport`]: outcome of a completed run
//! - [`SyncAborted`]: error, final counters and last committed batch of a halted run
//!
//! # Failure semantics
//! The first failing batch halts the run; later batches are never attempted and
//! nothing is retried. Everything committed before the failure stays committed.
//! Writes are upserts keyed by record id, so rerunning from the start is safe:
//! already synced documents are replaced by equivalent ones with fresh timestamps.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SyncOrchestrator`], [`SynchroniseReport`], [`SyncAborted`].

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::annotate::OrderAnnotator;
use crate::committer::BatchCommitter;
use crate::config::SyncConfig;
use crate::contract::{DocumentStore, RecordSource};
use crate::error::SyncError;
use crate::planner::{batch_count, plan_batches, Batch};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::record::{AnnotatedRecord, Record};
use crate::source::validate_ids;
use crate::state::{SyncPhase, SyncState};

/// Outcome of a run that committed every batch.
#[derive(Debug, Clone)]
pub struct SynchroniseReport {
    pub run_id: Uuid,
    pub collection: String,
    /// The instant written as `createdAt`/`updatedAt` on every document of this run.
    pub started_at: DateTime<Utc>,
    /// Sizes of the committed batches, in commit order.
    pub batch_sizes: Vec<usize>,
    pub state: SyncState,
}

impl SynchroniseReport {
    pub fn processed_count(&self) -> usize {
        self.state.processed_count
    }
}

/// A run halted before completion.
#[derive(Debug)]
pub struct SyncAborted {
    pub error: SyncError,
    /// Counters at the moment the run stopped; `phase` is [`SyncPhase::Failed`].
    pub state: SyncState,
}

impl fmt::Display for SyncAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "synchronisation halted with {} of {} records committed: {}",
            self.state.processed_count, self.state.total_records, self.error
        )
    }
}

impl std::error::Error for SyncAborted {}

impl SyncAborted {
    pub fn last_committed_batch(&self) -> Option<usize> {
        self.state.last_committed_batch()
    }

    pub fn processed_count(&self) -> usize {
        self.state.processed_count
    }
}

pub struct SyncOrchestrator<'a, S: ?Sized, R: ?Sized> {
    config: &'a SyncConfig,
    store: &'a S,
    reporter: &'a R,
}

impl<'a, S, R> SyncOrchestrator<'a, S, R>
where
    S: DocumentStore + ?Sized,
    R: ProgressReporter + ?Sized,
{
    pub fn new(config: &'a SyncConfig, store: &'a S, reporter: &'a R) -> Self {
        Self {
            config,
            store,
            reporter,
        }
    }

    /// Synchronise `records`, stamping every document with the current instant.
    pub async fn run(&self, records: &[Record]) -> Result<SynchroniseReport, SyncAborted> {
        self.run_at(records, Utc::now()).await
    }

    /// Synchronise `records` using `started_at` as the run's `createdAt`/`updatedAt`.
    pub async fn run_at(
        &self,
        records: &[Record],
        started_at: DateTime<Utc>,
    ) -> Result<SynchroniseReport, SyncAborted> {
        let run_id = Uuid::new_v4();
        let span = info_span!("sync_run", %run_id, collection = %self.config.collection);
        self.drive(run_id, records, started_at)
            .instrument(span)
            .await
    }

    async fn drive(
        &self,
        run_id: Uuid,
        records: &[Record],
        started_at: DateTime<Utc>,
    ) -> Result<SynchroniseReport, SyncAborted> {
        let limit = self.config.max_writes_per_batch;
        let mut state = SyncState::new(records.len());
        info!(
            total_records = records.len(),
            max_writes_per_batch = limit.get(),
            "[SYNC] Starting synchronisation run"
        );

        step(&mut state, SyncPhase::Planning)?;
        if let Err(e) = validate_ids(records) {
            return Err(halt(state, e));
        }
        state.total_batches = batch_count(records.len(), limit);
        let plan = plan_batches(records, limit);
        info!(total_batches = plan.len(), "[SYNC] Planned batches");

        let annotator = OrderAnnotator::new(started_at);
        let committer = BatchCommitter::new(self.store, &self.config.collection, limit);
        let mut batch_sizes = Vec::with_capacity(plan.len());

        for planned in &plan {
            step(&mut state, SyncPhase::CommittingBatch(planned.index))?;
            let batch = self.annotate_batch(&annotator, planned, &mut state);

            if let Err(e) = committer.commit(&batch).await {
                error!(
                    batch_index = batch.index,
                    last_committed_batch = ?state.last_committed_batch(),
                    processed_count = state.processed_count,
                    total_count = state.total_records,
                    defect = e.is_defect(),
                    "[SYNC][ERROR] Batch failed, halting run"
                );
                return Err(halt(state, e));
            }

            state.batch_committed(batch.len());
            batch_sizes.push(batch.len());
            self.reporter.report(&ProgressEvent::BatchCommitted {
                batch_index: batch.index,
                batch_size: batch.len(),
                processed_count: state.processed_count,
                total_count: state.total_records,
                total_batches: state.total_batches,
            });
        }

        step(&mut state, SyncPhase::Completed)?;
        self.reporter.report(&ProgressEvent::Summary {
            total_count: state.total_records,
            processed_count: state.processed_count,
            batches_committed: state.batches_committed,
            collection: self.config.collection.clone(),
        });
        info!(
            processed_count = state.processed_count,
            batches_committed = state.batches_committed,
            "[SYNC] Synchronisation complete"
        );

        Ok(SynchroniseReport {
            run_id,
            collection: self.config.collection.clone(),
            started_at,
            batch_sizes,
            state,
        })
    }

    fn annotate_batch(
        &self,
        annotator: &OrderAnnotator,
        planned: &Batch<Record>,
        state: &mut SyncState,
    ) -> Batch<AnnotatedRecord> {
        let items = planned
            .items
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let annotated = annotator.annotate(planned.offset + i, record);
                state.record_annotated();
                self.reporter.report(&ProgressEvent::RecordAnnotated {
                    order: annotated.order,
                    annotated_count: state.annotated_count,
                    processed_count: state.processed_count,
                    total_count: state.total_records,
                    batch_index: planned.index,
                    total_batches: state.total_batches,
                });
                annotated
            })
            .collect();
        Batch {
            index: planned.index,
            offset: planned.offset,
            items,
        }
    }
}

fn step(state: &mut SyncState, next: SyncPhase) -> Result<(), SyncAborted> {
    match state.transition(next) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "[SYNC][INVARIANT] Rejected state transition");
            Err(halt(state.clone(), e))
        }
    }
}

fn halt(mut state: SyncState, error: SyncError) -> SyncAborted {
    state.halt();
    SyncAborted { error, state }
}

/// Load `source` once and synchronise it into `config.collection`.
pub async fn synchronise<Src, S, R>(
    config: &SyncConfig,
    source: &Src,
    store: &S,
    reporter: &R,
) -> Result<SynchroniseReport, SyncAborted>
where
    Src: RecordSource + ?Sized,
    S: DocumentStore + ?Sized,
    R: ProgressReporter + ?Sized,
{
    let records = match source.load().await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Failed to load records");
            return Err(halt(SyncState::new(0), e));
        }
    };
    SyncOrchestrator::new(config, store, reporter)
        .run(&records)
        .await
}
