mod common;

use docsync_core::contract::RecordSource;
use docsync_core::progress::NoopReporter;
use docsync_core::record::Record;
use docsync_core::source::{parse_records, validate_ids, JsonFileSource, StaticRecordSource};
use docsync_core::store::InMemoryStore;
use docsync_core::synchronise::synchronise;
use docsync_core::SyncError;

#[test]
fn test_parse_records_keeps_file_order_and_fields() {
    let records = parse_records(
        r#"[
            {"id": "b-second", "title": "B"},
            {"id": "a-first", "title": "A", "tags": ["x"]}
        ]"#,
    )
    .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b-second", "a-first"]);
    assert_eq!(records[1].fields["tags"][0], "x");
    assert_eq!(records[1].fields["id"], "a-first");
}

#[test]
fn test_parse_records_rejects_bad_input_table_driven() {
    struct TestCase {
        name: &'static str,
        json: &'static str,
        expect_in_message: &'static str,
    }
    let test_cases = vec![
        TestCase {
            name: "not json",
            json: "[{",
            expect_in_message: "not valid JSON",
        },
        TestCase {
            name: "not an array",
            json: r#"{"id": "a"}"#,
            expect_in_message: "JSON array",
        },
        TestCase {
            name: "entry is not an object",
            json: r#"[{"id": "a"}, 3]"#,
            expect_in_message: "index 1 is not a JSON object",
        },
        TestCase {
            name: "missing id",
            json: r#"[{"title": "a"}]"#,
            expect_in_message: "no string \"id\"",
        },
        TestCase {
            name: "numeric id",
            json: r#"[{"id": 7}]"#,
            expect_in_message: "no string \"id\"",
        },
    ];

    for case in test_cases {
        match parse_records(case.json) {
            Err(SyncError::Source(msg)) => assert!(
                msg.contains(case.expect_in_message),
                "case '{}': unexpected message {msg}",
                case.name
            ),
            other => panic!("case '{}': expected a source error, got {other:?}", case.name),
        }
    }
}

#[tokio::test]
async fn test_json_file_source_reports_missing_file() {
    let source = JsonFileSource::new("/definitely/not/here/topics.json");
    let err = source.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Source(msg) if msg.contains("failed to read")));
}

#[tokio::test]
async fn test_static_source_serves_records_in_list_order() {
    let records = common::topics(4);
    let loaded = StaticRecordSource::new(records.clone()).load().await.unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn test_validate_ids_rejects_unusable_ids_table_driven() {
    struct TestCase {
        name: &'static str,
        ids: Vec<&'static str>,
        expect_in_message: Option<&'static str>,
    }
    let test_cases = vec![
        TestCase {
            name: "unique ids",
            ids: vec!["a", "b", "c"],
            expect_in_message: None,
        },
        TestCase {
            name: "empty id",
            ids: vec!["a", ""],
            expect_in_message: Some("index 1 has an empty id"),
        },
        TestCase {
            name: "slash in id",
            ids: vec!["a/b"],
            expect_in_message: Some("must not contain '/'"),
        },
        TestCase {
            name: "duplicate id",
            ids: vec!["a", "b", "a"],
            expect_in_message: Some("duplicate record id \"a\" at index 2"),
        },
    ];

    for case in test_cases {
        let records: Vec<Record> = case
            .ids
            .iter()
            .map(|id| Record::new(*id, Default::default()))
            .collect();
        match (validate_ids(&records), case.expect_in_message) {
            (Ok(()), None) => {}
            (Err(SyncError::Source(msg)), Some(expected)) => assert!(
                msg.contains(expected),
                "case '{}': unexpected message {msg}",
                case.name
            ),
            (other, _) => panic!("case '{}': unexpected result {other:?}", case.name),
        }
    }
}

#[tokio::test]
async fn test_sources_leave_id_checks_to_the_run() {
    let json = r#"[{"id": "a"}, {"id": "a"}]"#;
    let parsed = parse_records(json).expect("duplicates parse");
    assert_eq!(parsed.len(), 2);

    let mut records = common::topics(2);
    records.push(records[0].clone());
    let loaded = StaticRecordSource::new(records.clone()).load().await.unwrap();
    assert_eq!(loaded, records);

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), json).unwrap();
    let store = InMemoryStore::new();
    let aborted = synchronise(
        &common::config(5),
        &JsonFileSource::new(file.path()),
        &store,
        &NoopReporter,
    )
    .await
    .unwrap_err();

    assert!(matches!(aborted.error, SyncError::Source(msg) if msg.contains("duplicate")));
    assert_eq!(store.commit_attempts(), 0);
    assert!(store.is_empty("topics"));
}
