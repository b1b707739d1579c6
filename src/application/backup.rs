//! Backup and restore use cases

use crate::domain::Snapshot;
use crate::error::{AnsError, Result};
use crate::infrastructure::{Medium, RecordStore};
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;

/// File name offered for a backup taken at `now`, e.g. `backup_20250117_093000.json`
pub fn default_backup_filename(now: DateTime<Local>) -> String {
    format!("backup_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Write a snapshot of the whole store to `path` as pretty-printed JSON
pub fn export_backup<M: Medium>(store: &RecordStore<M>, path: &Path) -> Result<Snapshot> {
    let snapshot = store.backup();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, snapshot.to_json_pretty()?)?;
    tracing::info!(path = %path.display(), "Wrote backup");
    Ok(snapshot)
}

/// Replace the store's contents with the backup at `path`
pub fn import_backup<M: Medium>(store: &RecordStore<M>, path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)?;
    let snapshot = Snapshot::from_json(&text)?;

    let missing = snapshot.missing_metadata();
    if !missing.is_empty() {
        return Err(AnsError::InvalidBackup(format!(
            "missing {}",
            missing.join(" and ")
        )));
    }
    if !store.restore(&snapshot) {
        return Err(AnsError::Persist("backup".to_string()));
    }

    tracing::info!(path = %path.display(), "Restored backup");
    Ok(snapshot)
}
