//! Workspace settings (.ansledger/config.toml)

use crate::error::{AnsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the directory that marks a workspace
pub const WORKSPACE_DIR: &str = ".ansledger";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Rows per page in list output
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Default tracing filter when ANSLEDGER_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub created: DateTime<Utc>,
}

fn default_page_size() -> usize {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Settings {
            page_size: default_page_size(),
            log_level: default_log_level(),
            created: Utc::now(),
        }
    }

    /// Load settings from .ansledger/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(WORKSPACE_DIR).join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnsError::NotWorkspace(path.to_path_buf())
            } else {
                AnsError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| AnsError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save settings to .ansledger/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let workspace_dir = path.join(WORKSPACE_DIR);
        let config_path = workspace_dir.join("config.toml");

        if !workspace_dir.exists() {
            fs::create_dir(&workspace_dir)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| AnsError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_settings() {
        let settings = Settings::new();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::new();
        settings.page_size = 25;

        settings.save_to_dir(temp.path()).unwrap();

        assert!(temp.path().join(".ansledger").exists());
        assert!(temp.path().join(".ansledger/config.toml").exists());

        let loaded = Settings::load_from_dir(temp.path()).unwrap();
        assert_eq!(loaded.page_size, 25);
        assert_eq!(loaded.log_level, settings.log_level);
        assert_eq!(loaded.created, settings.created);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(WORKSPACE_DIR)).unwrap();
        fs::write(
            temp.path().join(".ansledger/config.toml"),
            "created = \"2025-01-17T09:30:00Z\"\n",
        )
        .unwrap();

        let loaded = Settings::load_from_dir(temp.path()).unwrap();
        assert_eq!(loaded.page_size, 10);
        assert_eq!(loaded.log_level, "warn");
    }

    #[test]
    fn test_load_missing_settings() {
        let temp = TempDir::new().unwrap();

        let result = Settings::load_from_dir(temp.path());

        match result.unwrap_err() {
            AnsError::NotWorkspace(_) => {}
            other => panic!("Expected NotWorkspace error, got {:?}", other),
        }
    }
}
