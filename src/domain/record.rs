//! Stored records and their field values

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Domain fields of a record, keyed by field name
pub type FieldMap = BTreeMap<String, Value>;

/// Field names owned by the store and never accepted from callers
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// One entity instance within a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: FieldMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a record with a fresh id, stamped with `now` for both timestamps
    pub fn new(fields: FieldMap, now: DateTime<Utc>) -> Self {
        Record {
            id: uuid::Uuid::new_v4().to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge `updates` over the current fields and refresh `updated_at`.
    ///
    /// `updated_at` always moves forward, even when the clock reads the same
    /// instant as the previous stamp.
    pub fn merge(&mut self, updates: FieldMap, now: DateTime<Utc>) {
        self.fields.extend(updates);
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }

    /// Look up a field, including the store-managed ones
    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::String(self.id.clone())),
            "created_at" => Some(Value::String(self.created_at.to_rfc3339())),
            "updated_at" => Some(Value::String(self.updated_at.to_rfc3339())),
            _ => self.fields.get(field).cloned(),
        }
    }

    /// Field rendered as plain text (strings unquoted)
    pub fn get_text(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| value_to_text(&v))
    }

    /// Human-readable code, if one was assigned
    pub fn code(&self) -> Option<&str> {
        self.fields.get("code").and_then(Value::as_str)
    }
}

/// Render a JSON value the way it would appear in a form field
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
