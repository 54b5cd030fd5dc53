#![allow(dead_code)]

use std::sync::Mutex;

use docsync_core::config::SyncConfig;
use docsync_core::progress::{ProgressEvent, ProgressReporter};
use docsync_core::record::{Fields, Record};
use serde_json::json;

/// Keeps every event it is handed, in order.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn batch_events(&self) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::BatchCommitted { .. }))
            .collect()
    }

    pub fn record_events(&self) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::RecordAnnotated { .. }))
            .collect()
    }

    pub fn summaries(&self) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::Summary { .. }))
            .collect()
    }
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn topic(i: usize) -> Record {
    let fields: Fields = json!({
        "id": format!("topic-{i:04}"),
        "title": format!("Topic {i}"),
        "difficulty": if i % 2 == 0 { "beginner" } else { "intermediate" },
        "tags": ["go", "concurrency"],
    })
    .as_object()
    .cloned()
    .unwrap();
    Record::new(format!("topic-{i:04}"), fields)
}

pub fn topics(n: usize) -> Vec<Record> {
    (0..n).map(topic).collect()
}

pub fn config(max_writes: usize) -> SyncConfig {
    SyncConfig::new("topics", max_writes).expect("valid test config")
}
