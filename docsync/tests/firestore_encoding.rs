use std::num::NonZeroUsize;
use std::time::Duration;

use docsync::store::{to_firestore_value, FirestoreClient, FirestoreSettings};
use docsync_core::contract::WriteBatch;
use serde_json::json;

#[test]
fn test_values_encode_by_type_table_driven() {
    let test_cases = vec![
        ("null", json!(null), json!({"nullValue": null})),
        ("bool", json!(true), json!({"booleanValue": true})),
        ("integer", json!(42), json!({"integerValue": "42"})),
        ("negative integer", json!(-3), json!({"integerValue": "-3"})),
        ("float", json!(1.5), json!({"doubleValue": 1.5})),
        ("string", json!("go"), json!({"stringValue": "go"})),
        (
            "array",
            json!(["a", 1]),
            json!({"arrayValue": {"values": [{"stringValue": "a"}, {"integerValue": "1"}]}}),
        ),
        (
            "map",
            json!({"level": "easy"}),
            json!({"mapValue": {"fields": {"level": {"stringValue": "easy"}}}}),
        ),
    ];

    for (name, input, expected) in test_cases {
        assert_eq!(to_firestore_value(&input), expected, "case '{name}'");
    }
}

#[test]
fn test_commit_body_names_each_document_by_id() {
    let client = FirestoreClient::new(FirestoreSettings {
        project_id: "learn-go".into(),
        database: "(default)".into(),
        base_url: "http://localhost:8080".into(),
        api_key: Some("k".into()),
        access_token: None,
        timeout: Duration::from_secs(5),
    })
    .expect("client builds");

    let mut batch = WriteBatch::begin(NonZeroUsize::new(500).unwrap());
    batch
        .upsert(
            "goroutines",
            json!({"title": "Goroutines", "order": 3})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

    let body = client.commit_body("topics", &batch);
    let writes = body["writes"].as_array().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0]["update"]["name"],
        "projects/learn-go/databases/(default)/documents/topics/goroutines"
    );
    assert_eq!(
        writes[0]["update"]["fields"]["order"],
        json!({"integerValue": "3"})
    );
    assert!(writes[0].get("updateMask").is_none());
    assert_eq!(client.project_id(), "learn-go");
}
