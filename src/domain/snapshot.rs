//! Backup snapshots
//!
//! A snapshot is a flat JSON object: one entry per persisted key plus the
//! `backup_date` and `backup_version` metadata. Both metadata fields must be
//! present for the snapshot to be accepted by a restore.

use crate::error::{AnsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Format version tag written into every backup
pub const BACKUP_VERSION: &str = "1.0.0";

pub const BACKUP_DATE_FIELD: &str = "backup_date";
pub const BACKUP_VERSION_FIELD: &str = "backup_version";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_version: Option<String>,
    /// Persisted key → stored value
    #[serde(flatten)]
    pub entries: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Parse a backup document
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AnsError::InvalidBackup(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(AnsError::InvalidBackup(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| AnsError::InvalidBackup(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Metadata fields that are absent or empty
    pub fn missing_metadata(&self) -> Vec<&'static str> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());
        let mut missing = Vec::new();
        if !present(&self.backup_date) {
            missing.push(BACKUP_DATE_FIELD);
        }
        if !present(&self.backup_version) {
            missing.push(BACKUP_VERSION_FIELD);
        }
        missing
    }

    /// A snapshot is restorable only when it names both its date and its version
    pub fn is_self_describing(&self) -> bool {
        self.missing_metadata().is_empty()
    }
}
