//! Collection keys, entity types and human-readable code formats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage key of the system configuration record
pub const SYSTEM_CONFIG_KEY: &str = "ans_system_config";

/// Storage key of the counter table
pub const COUNTERS_KEY: &str = "ans_counters";

/// The four record collections kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    /// Business partners (customers, suppliers, or both)
    Partners,
    ExpenseItems,
    PaymentTerms,
    LedgerEntries,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 4] = [
        CollectionKey::Partners,
        CollectionKey::ExpenseItems,
        CollectionKey::PaymentTerms,
        CollectionKey::LedgerEntries,
    ];

    /// Key under which the collection is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            CollectionKey::Partners => "ans_customers",
            CollectionKey::ExpenseItems => "ans_expense_items",
            CollectionKey::PaymentTerms => "ans_payment_terms",
            CollectionKey::LedgerEntries => "ans_ledger_entries",
        }
    }

    /// Entity type whose counter issues codes for this collection
    pub fn entity_type(&self) -> EntityType {
        match self {
            CollectionKey::Partners => EntityType::Customer,
            CollectionKey::ExpenseItems => EntityType::ExpenseItem,
            CollectionKey::PaymentTerms => EntityType::PaymentTerm,
            CollectionKey::LedgerEntries => EntityType::LedgerEntry,
        }
    }

    /// Name used on the command line and in messages
    pub fn cli_name(&self) -> &'static str {
        match self {
            CollectionKey::Partners => "partners",
            CollectionKey::ExpenseItems => "expense-items",
            CollectionKey::PaymentTerms => "payment-terms",
            CollectionKey::LedgerEntries => "ledger",
        }
    }

    /// Fields scanned by free-text search in list views
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            CollectionKey::Partners => &["name", "code", "contact_person"],
            CollectionKey::ExpenseItems => &["name", "code", "category"],
            CollectionKey::PaymentTerms => &["name", "code"],
            CollectionKey::LedgerEntries => &["code", "description", "partner_id"],
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for CollectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "partners" | "partner" | "customers" | "customer" => Ok(CollectionKey::Partners),
            "expense-items" | "expense-item" | "expenses" => Ok(CollectionKey::ExpenseItems),
            "payment-terms" | "payment-term" | "terms" => Ok(CollectionKey::PaymentTerms),
            "ledger" | "ledger-entries" | "ledger-entry" => Ok(CollectionKey::LedgerEntries),
            _ => Err(format!(
                "Invalid collection: '{}'. Valid collections are: partners, expense-items, payment-terms, ledger",
                s
            )),
        }
    }
}

/// Entity types with their own code sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Customer,
    ExpenseItem,
    PaymentTerm,
    LedgerEntry,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Customer,
        EntityType::ExpenseItem,
        EntityType::PaymentTerm,
        EntityType::LedgerEntry,
    ];

    /// Name of this type's entry in the counter table
    pub fn counter_name(&self) -> &'static str {
        match self {
            EntityType::Customer => "customer",
            EntityType::ExpenseItem => "expense_item",
            EntityType::PaymentTerm => "payment_term",
            EntityType::LedgerEntry => "ledger_entry",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            EntityType::Customer => "ANSC",
            EntityType::ExpenseItem => "EXPS",
            EntityType::PaymentTerm => "PAYT",
            EntityType::LedgerEntry => "LEDG",
        }
    }

    /// Zero-padded digit width of the numeric part
    pub fn width(&self) -> usize {
        match self {
            EntityType::Customer => 6,
            EntityType::ExpenseItem => 4,
            EntityType::PaymentTerm => 3,
            EntityType::LedgerEntry => 6,
        }
    }

    /// Counter value on a fresh store; the first issued code is seed + 1
    pub fn seed(&self) -> u64 {
        match self {
            EntityType::Customer => 10000,
            EntityType::ExpenseItem => 1000,
            EntityType::PaymentTerm => 100,
            EntityType::LedgerEntry => 1,
        }
    }

    /// Format a sequence number as a human-readable code, e.g. `EXPS-1001`
    pub fn format_code(&self, number: u64) -> String {
        format!("{}-{:0width$}", self.prefix(), number, width = self.width())
    }
}
