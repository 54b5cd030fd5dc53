//! Records as they come from a source, and as they are written to the store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map of a record or stored document.
pub type Fields = Map<String, Value>;

/// Field name carrying the 1-based source position.
pub const ORDER_FIELD: &str = "order";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// An identified payload supplied by a record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// A record with its run-scoped positional metadata attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: Record,
    /// 1-based position in the source sequence.
    pub order: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnnotatedRecord {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// The document body written for this record: source fields plus `order`,
    /// `createdAt` and `updatedAt`. Metadata wins over a source field of the same name.
    pub fn to_document(&self) -> Fields {
        let mut doc = self.record.fields.clone();
        doc.insert(ORDER_FIELD.to_string(), Value::from(self.order));
        doc.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        doc.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        doc
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix, e.g. `2024-05-01T12:00:00.000Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
