use chrono::{DateTime, Utc};

use crate::record::{AnnotatedRecord, Record};

/// Stamps records with their source position and the run start instant.
///
/// The instant is captured once per run, so every record written by one run
/// shares the same `createdAt`/`updatedAt`.
#[derive(Debug, Clone, Copy)]
pub struct OrderAnnotator {
    run_started_at: DateTime<Utc>,
}

impl OrderAnnotator {
    pub fn new(run_started_at: DateTime<Utc>) -> Self {
        Self { run_started_at }
    }

    /// Captures the current instant as the run start.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn run_started_at(&self) -> DateTime<Utc> {
        self.run_started_at
    }

    /// Annotate the record found at zero-based `source_index`.
    pub fn annotate(&self, source_index: usize, record: &Record) -> AnnotatedRecord {
        AnnotatedRecord {
            record: record.clone(),
            order: source_index as u64 + 1,
            created_at: self.run_started_at,
            updated_at: self.run_started_at,
        }
    }
}
