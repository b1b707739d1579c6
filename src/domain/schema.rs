//! Per-collection field schemas
//!
//! Every collection accepts a closed set of fields. Submissions are checked
//! and coerced here before they reach the store: form-style string input for
//! numeric fields becomes a JSON number, choice fields must name one of their
//! options, and anything the schema does not know is rejected.

use crate::domain::collection::CollectionKey;
use crate::domain::record::{FieldMap, SYSTEM_FIELDS};
use crate::error::{AnsError, FieldError, Result};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[\d\-\+\s\(\)]+$").unwrap())
}

pub const STATUSES: &[&str] = &["active", "inactive"];
pub const PARTNER_TYPES: &[&str] = &["customer", "supplier", "both"];
pub const CURRENCIES: &[&str] = &["CNY", "USD", "EUR", "JPY", "HKD"];
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "transport",
    "storage",
    "handling",
    "packaging",
    "insurance",
    "customs",
    "commission",
    "other",
];
pub const TAX_TYPES: &[&str] = &["taxable", "exempt", "zero_rate", "reduced_rate"];
pub const LEDGER_STATUSES: &[&str] = &["open", "settled", "void"];

/// What a field holds and how incoming values are checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    /// Human-readable code: never blank, fixed once the record exists
    Code,
    Choice(&'static [&'static str]),
    Number { min: Option<f64> },
    Email,
    Phone,
    /// RFC 3339 instant or `YYYY-MM-DD`
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required,
    }
}

const PARTNER_FIELDS: &[FieldSpec] = &[
    field("code", FieldKind::Code, false),
    field("name", FieldKind::Text, true),
    field("type", FieldKind::Choice(PARTNER_TYPES), true),
    field("contact_person", FieldKind::Text, false),
    field("phone", FieldKind::Phone, false),
    field("email", FieldKind::Email, false),
    field("address", FieldKind::Text, false),
    field("notes", FieldKind::Text, false),
    field("status", FieldKind::Choice(STATUSES), false),
];

const EXPENSE_ITEM_FIELDS: &[FieldSpec] = &[
    field("code", FieldKind::Code, false),
    field("name", FieldKind::Text, true),
    field("category", FieldKind::Choice(EXPENSE_CATEGORIES), true),
    field("tax_type", FieldKind::Choice(TAX_TYPES), true),
    field("default_currency", FieldKind::Choice(CURRENCIES), true),
    field("default_price", FieldKind::Number { min: Some(0.0) }, false),
    field("unit", FieldKind::Text, false),
    field("notes", FieldKind::Text, false),
    field("status", FieldKind::Choice(STATUSES), false),
];

const PAYMENT_TERM_FIELDS: &[FieldSpec] = &[
    field("code", FieldKind::Code, false),
    field("name", FieldKind::Text, true),
    field("days", FieldKind::Number { min: Some(0.0) }, true),
    field("description", FieldKind::Text, false),
    field("status", FieldKind::Choice(STATUSES), false),
];

const LEDGER_ENTRY_FIELDS: &[FieldSpec] = &[
    field("code", FieldKind::Code, false),
    field("partner_id", FieldKind::Text, true),
    field("expense_item_id", FieldKind::Text, false),
    field("entry_date", FieldKind::Date, true),
    field("amount", FieldKind::Number { min: None }, true),
    field("currency", FieldKind::Choice(CURRENCIES), false),
    field("description", FieldKind::Text, false),
    field("status", FieldKind::Choice(LEDGER_STATUSES), false),
];

/// Field specs accepted by a collection
pub fn schema_for(collection: CollectionKey) -> &'static [FieldSpec] {
    match collection {
        CollectionKey::Partners => PARTNER_FIELDS,
        CollectionKey::ExpenseItems => EXPENSE_ITEM_FIELDS,
        CollectionKey::PaymentTerms => PAYMENT_TERM_FIELDS,
        CollectionKey::LedgerEntries => LEDGER_ENTRY_FIELDS,
    }
}

/// Whether a submission creates a record or patches an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Create,
    Update,
}

/// Validate and coerce `fields` for `collection`.
///
/// All problems are collected so the caller can report them together.
pub fn validate(
    collection: CollectionKey,
    fields: FieldMap,
    submission: Submission,
) -> Result<FieldMap> {
    let specs = schema_for(collection);
    let mut errors = Vec::new();
    let mut coerced = FieldMap::new();

    for (name, value) in fields {
        if SYSTEM_FIELDS.contains(&name.as_str()) {
            errors.push(FieldError::new(&name, "is managed by the store"));
            continue;
        }
        let Some(spec) = specs.iter().find(|s| s.name == name) else {
            errors.push(FieldError::new(
                &name,
                format!("is not a field of {}", collection),
            ));
            continue;
        };
        if spec.kind == FieldKind::Code && submission == Submission::Update {
            errors.push(FieldError::new(&name, "cannot be changed once issued"));
            continue;
        }
        match coerce(spec, value) {
            Ok(v) => {
                coerced.insert(name, v);
            }
            Err(message) => errors.push(FieldError::new(&name, message)),
        }
    }

    if submission == Submission::Create {
        for spec in specs.iter().filter(|s| s.required) {
            if !coerced.contains_key(spec.name) && !errors.iter().any(|e| e.field == spec.name) {
                errors.push(FieldError::new(spec.name, "is required"));
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(AnsError::Validation(errors))
    }
}

fn coerce(spec: &FieldSpec, value: Value) -> std::result::Result<Value, String> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => {
            if let FieldKind::Number { min } = spec.kind {
                return check_number(n, min);
            }
            n.to_string()
        }
        Value::Bool(b) if spec.kind == FieldKind::Text => b.to_string(),
        _ => return Err("must be a plain value".to_string()),
    };

    if text.trim().is_empty() {
        return match spec.kind {
            FieldKind::Code => Err("must not be blank".to_string()),
            _ if spec.required => Err("is required".to_string()),
            _ => Ok(Value::String(String::new())),
        };
    }

    match spec.kind {
        FieldKind::Text => Ok(Value::String(text)),
        FieldKind::Code => Ok(Value::String(text.trim().to_string())),
        FieldKind::Choice(options) => {
            if options.contains(&text.as_str()) {
                Ok(Value::String(text))
            } else {
                Err(format!("must be one of: {}", options.join(", ")))
            }
        }
        FieldKind::Number { min } => {
            let trimmed = text.trim();
            let number = if let Ok(i) = trimmed.parse::<i64>() {
                Number::from(i)
            } else {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| "must be a number".to_string())?
            };
            check_number(number, min)
        }
        FieldKind::Email => {
            if email_regex().is_match(&text) {
                Ok(Value::String(text))
            } else {
                Err("is not a valid email address".to_string())
            }
        }
        FieldKind::Phone => {
            if phone_regex().is_match(&text) {
                Ok(Value::String(text))
            } else {
                Err("is not a valid phone number".to_string())
            }
        }
        FieldKind::Date => {
            let ok = DateTime::parse_from_rfc3339(&text).is_ok()
                || NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok();
            if ok {
                Ok(Value::String(text))
            } else {
                Err("must be a date (YYYY-MM-DD)".to_string())
            }
        }
    }
}

fn check_number(number: Number, min: Option<f64>) -> std::result::Result<Value, String> {
    let as_f64 = number.as_f64().unwrap_or(f64::NAN);
    if !as_f64.is_finite() {
        return Err("must be a number".to_string());
    }
    if let Some(min) = min {
        if as_f64 < min {
            return Err(format!("must be at least {}", min));
        }
    }
    Ok(Value::Number(number))
}
