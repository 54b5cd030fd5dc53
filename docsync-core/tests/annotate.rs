mod common;

use chrono::{TimeZone, Utc};
use docsync_core::annotate::OrderAnnotator;
use docsync_core::record::{format_timestamp, Record};
use serde_json::{json, Value};

#[test]
fn test_order_is_source_position_plus_one() {
    let records = common::topics(25);
    let annotator = OrderAnnotator::starting_now();

    let annotated: Vec<_> = records
        .iter()
        .enumerate()
        .map(|(i, r)| annotator.annotate(i, r))
        .collect();

    for (i, a) in annotated.iter().enumerate() {
        assert_eq!(a.order, i as u64 + 1);
        assert_eq!(a.id(), records[i].id);
    }
    assert!(annotated.windows(2).all(|w| w[0].order < w[1].order));
}

#[test]
fn test_all_records_of_a_run_share_the_start_instant() {
    let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let annotator = OrderAnnotator::new(started);

    for (i, record) in common::topics(10).iter().enumerate() {
        let a = annotator.annotate(i, record);
        assert_eq!(a.created_at, started);
        assert_eq!(a.updated_at, started);
    }
    assert_eq!(annotator.run_started_at(), started);
}

#[test]
fn test_document_carries_fields_and_metadata() {
    let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let record = Record::new(
        "goroutines",
        json!({"id": "goroutines", "title": "Goroutines", "order": 99})
            .as_object()
            .cloned()
            .unwrap(),
    );

    let doc = OrderAnnotator::new(started).annotate(4, &record).to_document();

    assert_eq!(doc["title"], json!("Goroutines"));
    assert_eq!(doc["id"], json!("goroutines"));
    // Positional metadata replaces a source field of the same name.
    assert_eq!(doc["order"], json!(5));
    assert_eq!(doc["createdAt"], Value::String("2024-05-01T12:00:00.000Z".into()));
    assert_eq!(doc["updatedAt"], doc["createdAt"]);
}

#[test]
fn test_timestamp_format_uses_millis_and_z_suffix() {
    let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap()
        + chrono::Duration::milliseconds(123);
    assert_eq!(format_timestamp(&ts), "2023-12-31T23:59:58.123Z");
}
