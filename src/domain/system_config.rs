//! Global settings stored alongside the collections

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema version written into a freshly seeded configuration
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default)]
    pub company_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Keys written by other versions are carried along untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_currency() -> String {
    "JPY".to_string()
}

fn default_date_format() -> String {
    "YYYY-MM-DD".to_string()
}

fn default_tax_rate() -> f64 {
    0.1
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            currency: default_currency(),
            date_format: default_date_format(),
            tax_rate: default_tax_rate(),
            company_name: String::new(),
            version: default_version(),
            extra: BTreeMap::new(),
        }
    }
}

/// Partial configuration; only the `Some` fields are merged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub currency: Option<String>,
    pub date_format: Option<String>,
    pub tax_rate: Option<f64>,
    pub company_name: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }
}

impl SystemConfig {
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(date_format) = update.date_format {
            self.date_format = date_format;
        }
        if let Some(tax_rate) = update.tax_rate {
            self.tax_rate = tax_rate;
        }
        if let Some(company_name) = update.company_name {
            self.company_name = company_name;
        }
    }
}
