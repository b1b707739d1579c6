//! Error types for ansledger

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ansledger
#[derive(Debug, Error)]
pub enum AnsError {
    #[error("Not an ansledger workspace: {0}")]
    NotWorkspace(PathBuf),

    #[error("Record not found: {collection}/{id}")]
    RecordNotFound { collection: String, id: String },

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Code sequence for '{0}' is exhausted")]
    CounterExhausted(String),

    #[error("Failed to persist '{0}'")]
    Persist(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// A single rejected field from a record submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AnsError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AnsError::NotWorkspace(_) => 2,
            AnsError::RecordNotFound { .. } => 3,
            AnsError::InvalidBackup(_) => 4,
            AnsError::Validation(_) => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            AnsError::NotWorkspace(path) => {
                format!(
                    "Not an ansledger workspace: {}\n\n\
                    Suggestions:\n\
                    • Run 'ansledger init' in this directory to create a new workspace\n\
                    • Navigate to an existing workspace\n\
                    • Set ANSLEDGER_ROOT environment variable to your workspace path",
                    path.display()
                )
            }
            AnsError::RecordNotFound { collection, id } => {
                format!(
                    "No record with id '{}' in {}\n\n\
                    Suggestions:\n\
                    • Use 'ansledger list {}' to see existing records\n\
                    • Ids are the long identifiers, not the ANSC-/EXPS- codes",
                    id, collection, collection
                )
            }
            AnsError::InvalidBackup(msg) => {
                format!(
                    "Invalid backup: {}\n\n\
                    A backup file is a JSON object produced by 'ansledger backup'.\n\
                    It must contain both 'backup_date' and 'backup_version'.",
                    msg
                )
            }
            AnsError::Validation(errors) => {
                let mut out = String::from("Validation failed:\n");
                for e in errors {
                    out.push_str(&format!("  • {}: {}\n", e.field, e.message));
                }
                out.push_str("\nFields are given as KEY=VALUE, e.g. name=Acme type=customer");
                out
            }
            AnsError::QuotaExceeded { .. } => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Delete records you no longer need\n\
                    • Run 'ansledger backup' and then 'ansledger clear --yes' to start over",
                    self
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using AnsError
pub type Result<T> = std::result::Result<T, AnsError>;
