//! Config management use case
//!
//! Two layers share the `config` command: workspace settings kept in
//! `.ansledger/config.toml` and the system configuration kept in the store.

use crate::domain::schema::CURRENCIES;
use crate::domain::ConfigUpdate;
use crate::error::{AnsError, Result};
use crate::infrastructure::{FileSystemRepository, Medium, RecordStore, WorkspaceRepository};

const VALID_KEYS: &str = "page_size, log_level, currency, date_format, tax_rate, company_name";

/// Service for reading and changing configuration
pub struct ConfigService<'a, M: Medium> {
    repository: FileSystemRepository,
    store: &'a RecordStore<M>,
}

impl<'a, M: Medium> ConfigService<'a, M> {
    pub fn new(repository: FileSystemRepository, store: &'a RecordStore<M>) -> Self {
        ConfigService { repository, store }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let settings = self.repository.load_settings()?;
        let config = self.store.config();

        match key {
            "page_size" => Ok(settings.page_size.to_string()),
            "log_level" => Ok(settings.log_level),
            "created" => Ok(settings.created.to_rfc3339()),
            "currency" => Ok(config.currency),
            "date_format" => Ok(config.date_format),
            "tax_rate" => Ok(config.tax_rate.to_string()),
            "company_name" => Ok(config.company_name),
            "version" => Ok(config.version),
            _ => Err(AnsError::Config(format!(
                "Unknown config key: '{}'. Valid keys are: {}, created, version",
                key, VALID_KEYS
            ))),
        }
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        match key {
            "page_size" | "log_level" => {
                let mut settings = self.repository.load_settings()?;
                if key == "page_size" {
                    settings.page_size = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| {
                            AnsError::Config(format!(
                                "Invalid page_size: '{}'. Expected a positive number",
                                value
                            ))
                        })?;
                } else {
                    settings.log_level = value.to_string();
                }
                self.repository.save_settings(&settings)
            }
            "currency" | "date_format" | "tax_rate" | "company_name" => {
                let update = match key {
                    "currency" => {
                        let currency = value.trim().to_uppercase();
                        if !CURRENCIES.contains(&currency.as_str()) {
                            return Err(AnsError::Config(format!(
                                "Invalid currency: '{}'. Valid currencies are: {}",
                                value,
                                CURRENCIES.join(", ")
                            )));
                        }
                        ConfigUpdate {
                            currency: Some(currency),
                            ..Default::default()
                        }
                    }
                    "date_format" => ConfigUpdate {
                        date_format: Some(value.to_string()),
                        ..Default::default()
                    },
                    "tax_rate" => {
                        let rate = value
                            .parse::<f64>()
                            .ok()
                            .filter(|r| r.is_finite() && *r >= 0.0)
                            .ok_or_else(|| {
                                AnsError::Config(format!(
                                    "Invalid tax_rate: '{}'. Expected a number such as 0.1",
                                    value
                                ))
                            })?;
                        ConfigUpdate {
                            tax_rate: Some(rate),
                            ..Default::default()
                        }
                    }
                    _ => ConfigUpdate {
                        company_name: Some(value.to_string()),
                        ..Default::default()
                    },
                };
                self.store.update_config(update).map(|_| ())
            }
            "created" | "version" => Err(AnsError::Config(format!(
                "Cannot modify '{}' field (read-only)",
                key
            ))),
            _ => Err(AnsError::Config(format!(
                "Unknown config key: '{}'. Valid keys are: {}",
                key, VALID_KEYS
            ))),
        }
    }

    /// All config values as key/value pairs
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        [
            "page_size",
            "log_level",
            "created",
            "currency",
            "date_format",
            "tax_rate",
            "company_name",
            "version",
        ]
        .iter()
        .map(|key| Ok((key.to_string(), self.get(key)?)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{FileMedium, Settings};
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> (FileSystemRepository, RecordStore<FileMedium>) {
        let repo = FileSystemRepository::new(temp.path().to_path_buf());
        repo.initialize().unwrap();
        repo.save_settings(&Settings::new()).unwrap();
        let store = repo.open_store().unwrap();
        (repo, store)
    }

    #[test]
    fn test_get_defaults() {
        let temp = TempDir::new().unwrap();
        let (repo, store) = workspace(&temp);
        let service = ConfigService::new(repo, &store);

        assert_eq!(service.get("page_size").unwrap(), "10");
        assert_eq!(service.get("currency").unwrap(), "JPY");
        assert_eq!(service.get("tax_rate").unwrap(), "0.1");
        assert_eq!(service.get("version").unwrap(), "1.0.0");
    }

    #[test]
    fn test_set_settings_and_system_values() {
        let temp = TempDir::new().unwrap();
        let (repo, store) = workspace(&temp);
        let service = ConfigService::new(repo.clone(), &store);

        service.set("page_size", "25").unwrap();
        service.set("currency", "usd").unwrap();
        service.set("company_name", "ANS Logistics").unwrap();

        assert_eq!(repo.load_settings().unwrap().page_size, 25);
        assert_eq!(store.config().currency, "USD");
        assert_eq!(service.get("company_name").unwrap(), "ANS Logistics");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let (repo, store) = workspace(&temp);
        let service = ConfigService::new(repo, &store);

        assert!(service.set("page_size", "0").is_err());
        assert!(service.set("tax_rate", "ten").is_err());
        assert!(service.set("currency", "DOGE").is_err());
        assert_eq!(store.config().currency, "JPY");
        assert!(service.set("version", "2.0.0").is_err());
        assert!(service.set("theme", "dark").is_err());
        assert!(service.get("theme").is_err());
    }

    #[test]
    fn test_list_contains_every_key() {
        let temp = TempDir::new().unwrap();
        let (repo, store) = workspace(&temp);
        let service = ConfigService::new(repo, &store);

        let keys: Vec<String> = service.list().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 8);
        assert!(keys.contains(&"company_name".to_string()));
    }
}
