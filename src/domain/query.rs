//! Record matching and ordering
//!
//! `Criteria` implements the store's find semantics: every criterion must
//! match, and a value starting with `%` is a case-insensitive substring
//! search over the stringified field. Sorting is stable in both directions,
//! so records that compare equal keep their insertion order.

use crate::domain::record::{value_to_text, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Marker that turns a criterion into a substring search
pub const WILDCARD: char = '%';

/// Field → expected value. Empty criteria match every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria(BTreeMap<String, Value>);

impl Criteria {
    pub fn new() -> Self {
        Criteria(BTreeMap::new())
    }

    /// Add a criterion, replacing any previous one for the same field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, expected)| {
            let actual = record.get(field);
            match expected {
                Value::String(s) if s.starts_with(WILDCARD) => {
                    let needle = s[WILDCARD.len_utf8()..].to_lowercase();
                    actual
                        .map(|v| value_to_text(&v).to_lowercase().contains(&needle))
                        .unwrap_or(false)
                }
                Value::String(s) => actual.map(|v| value_to_text(&v) == *s).unwrap_or(false),
                other => actual.as_ref() == Some(other),
            }
        })
    }
}

impl FromIterator<(String, Value)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Criteria(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: '{}'. Use asc or desc", s)),
        }
    }
}

/// Fields compared as timestamps rather than text
pub fn is_date_field(field: &str) -> bool {
    field.contains("date") || field.ends_with("_at")
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// A field value reduced to what it sorts by.
///
/// Classes rank `Missing < Instant < Number < Text`; values only compare
/// within their class, which keeps the ordering total for mixed columns.
#[derive(Debug)]
enum SortKey {
    Missing,
    Instant(DateTime<Utc>),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(record: &Record, field: &str) -> Self {
        let value = match record.get(field) {
            None | Some(Value::Null) => return SortKey::Missing,
            Some(value) => value,
        };
        if is_date_field(field) {
            if let Some(instant) = parse_timestamp(&value_to_text(&value)) {
                return SortKey::Instant(instant);
            }
        }
        match as_number(&value) {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(value_to_text(&value)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Instant(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compare two records on `field` in ascending order.
///
/// Missing values sort first, then timestamps (date-like fields only), then
/// numeric-looking values in numeric order, then everything else as text.
pub fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    SortKey::of(a, field).compare(&SortKey::of(b, field))
}

/// Stable sort of `records` by `field`
pub fn sort_by_field(records: &mut [Record], field: &str, order: SortOrder) {
    records.sort_by(|a, b| match order {
        SortOrder::Asc => compare_field(a, b, field),
        SortOrder::Desc => compare_field(b, a, field),
    });
}
