//! The record store: sole owner of persisted state
//!
//! Every mutation of collections, counters and configuration goes through
//! `RecordStore`. Not-found conditions are reported as `None`/`false`; failures
//! of the underlying medium are logged here and surfaced as a failure value,
//! never retried.

use crate::domain::collection::{CollectionKey, EntityType, COUNTERS_KEY, SYSTEM_CONFIG_KEY};
use crate::domain::query::{sort_by_field, Criteria, SortOrder};
use crate::domain::record::{FieldMap, Record};
use crate::domain::schema::{self, Submission};
use crate::domain::snapshot::{Snapshot, BACKUP_VERSION};
use crate::domain::system_config::{ConfigUpdate, SystemConfig};
use crate::error::{AnsError, FieldError, Result};
use crate::infrastructure::medium::Medium;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Last issued sequence number per entity type.
///
/// Kept as a raw JSON object so entries this version does not know survive
/// every counter update.
pub type CounterTable = Map<String, Value>;

/// Record counts of the four standard collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub customers: usize,
    pub expense_items: usize,
    pub payment_terms: usize,
    pub ledger_entries: usize,
}

impl Stats {
    pub fn count(&self, collection: CollectionKey) -> usize {
        match collection {
            CollectionKey::Partners => self.customers,
            CollectionKey::ExpenseItems => self.expense_items,
            CollectionKey::PaymentTerms => self.payment_terms,
            CollectionKey::LedgerEntries => self.ledger_entries,
        }
    }
}

/// Counter table of a fresh store
pub fn default_counters() -> CounterTable {
    EntityType::ALL
        .iter()
        .map(|ty| (ty.counter_name().to_string(), Value::from(ty.seed())))
        .collect()
}

pub struct RecordStore<M: Medium> {
    medium: M,
}

impl<M: Medium> RecordStore<M> {
    /// Open a store over `medium`, seeding any key that is absent
    pub fn open(medium: M) -> Self {
        let store = RecordStore { medium };
        store.seed();
        store
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    fn seed(&self) {
        if self.read_value(COUNTERS_KEY).is_none() {
            self.write(COUNTERS_KEY, &default_counters());
        }
        if self.read_value(SYSTEM_CONFIG_KEY).is_none() {
            self.write(SYSTEM_CONFIG_KEY, &SystemConfig::default());
        }
        for collection in CollectionKey::ALL {
            if self.read_value(collection.storage_key()).is_none() {
                self.write(collection.storage_key(), &Vec::<Record>::new());
            }
        }
    }

    /// Raw JSON stored under `key`.
    ///
    /// Unreadable or unparsable values are treated as absent.
    pub fn read_value(&self, key: &str) -> Option<Value> {
        let text = match self.medium.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to read from storage");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored value is not valid JSON; treating as absent");
                None
            }
        }
    }

    /// The stored sequence for a collection, `None` if absent or corrupt
    pub fn read(&self, collection: CollectionKey) -> Option<Vec<Record>> {
        let key = collection.storage_key();
        let value = self.read_value(key)?;
        match serde_json::from_value(value) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored collection is malformed; treating as absent");
                None
            }
        }
    }

    /// Serialize and persist `value`; `false` if the medium refused it
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to serialize value");
                return false;
            }
        };
        match self.medium.set_item(key, &text) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to write to storage");
                false
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if self.write(key, value) {
            Ok(())
        } else {
            Err(AnsError::Persist(key.to_string()))
        }
    }

    fn counters(&self) -> CounterTable {
        match self.read_value(COUNTERS_KEY) {
            Some(Value::Object(table)) => table,
            Some(_) => {
                tracing::warn!(
                    key = COUNTERS_KEY,
                    "Counter table is not an object; starting over"
                );
                CounterTable::new()
            }
            None => CounterTable::new(),
        }
    }

    /// Issue the next code for `entity_type`, e.g. `EXPS-1001`.
    ///
    /// The number is consumed as soon as the counter table is persisted, even
    /// if the caller never creates the record. An entry that is missing or not
    /// a whole number restarts from the type's seed; other entries are kept.
    pub fn next_code(&self, entity_type: EntityType) -> Result<String> {
        let mut counters = self.counters();
        let name = entity_type.counter_name();
        let last = match counters.get(name) {
            Some(value) => value.as_u64().unwrap_or_else(|| {
                tracing::warn!(
                    entity = name,
                    %value,
                    "Counter entry is not a whole number; using seed"
                );
                entity_type.seed()
            }),
            None => entity_type.seed(),
        };
        let next = last
            .checked_add(1)
            .ok_or_else(|| AnsError::CounterExhausted(name.to_string()))?;
        counters.insert(name.to_string(), Value::from(next));
        self.persist(COUNTERS_KEY, &counters)?;
        tracing::debug!(entity = name, number = next, "Issued code");
        Ok(entity_type.format_code(next))
    }

    /// Validate `fields`, stamp a new record and append it to `collection`.
    ///
    /// A supplied `code` must not already be used in the collection.
    pub fn add_record(&self, collection: CollectionKey, fields: FieldMap) -> Result<Record> {
        let fields = schema::validate(collection, fields, Submission::Create)?;
        let mut records = self.read(collection).unwrap_or_default();
        if let Some(code) = fields.get("code").and_then(Value::as_str) {
            if records.iter().any(|r| r.code() == Some(code)) {
                return Err(AnsError::Validation(vec![FieldError::new(
                    "code",
                    format!("'{}' is already used in {}", code, collection),
                )]));
            }
        }
        let record = Record::new(fields, Utc::now());
        records.push(record.clone());
        self.persist(collection.storage_key(), &records)?;
        tracing::debug!(collection = %collection, id = %record.id, "Added record");
        Ok(record)
    }

    /// Merge `fields` into the record with `id`; `Ok(None)` if there is none
    pub fn update_record(
        &self,
        collection: CollectionKey,
        id: &str,
        fields: FieldMap,
    ) -> Result<Option<Record>> {
        let mut records = self.read(collection).unwrap_or_default();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        let fields = schema::validate(collection, fields, Submission::Update)?;
        record.merge(fields, Utc::now());
        let updated = record.clone();
        self.persist(collection.storage_key(), &records)?;
        tracing::debug!(collection = %collection, id, "Updated record");
        Ok(Some(updated))
    }

    /// Remove the record with `id`; `Ok(false)` leaves the collection untouched
    pub fn delete_record(&self, collection: CollectionKey, id: &str) -> Result<bool> {
        let mut records = self.read(collection).unwrap_or_default();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(collection.storage_key(), &records)?;
        tracing::debug!(collection = %collection, id, "Deleted record");
        Ok(true)
    }

    pub fn find_records(&self, collection: CollectionKey, criteria: &Criteria) -> Vec<Record> {
        let records = self.read(collection).unwrap_or_default();
        if criteria.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| criteria.matches(r)).collect()
    }

    /// The collection sorted by `field`; equal records keep insertion order
    pub fn sort_records(
        &self,
        collection: CollectionKey,
        field: &str,
        order: SortOrder,
    ) -> Vec<Record> {
        let mut records = self.read(collection).unwrap_or_default();
        sort_by_field(&mut records, field, order);
        records
    }

    pub fn stats(&self) -> Stats {
        let count = |c: CollectionKey| self.read(c).map(|r| r.len()).unwrap_or(0);
        Stats {
            customers: count(CollectionKey::Partners),
            expense_items: count(CollectionKey::ExpenseItems),
            payment_terms: count(CollectionKey::PaymentTerms),
            ledger_entries: count(CollectionKey::LedgerEntries),
        }
    }

    /// Current system configuration, defaults if unreadable
    pub fn config(&self) -> SystemConfig {
        self.read_value(SYSTEM_CONFIG_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn update_config(&self, update: ConfigUpdate) -> Result<SystemConfig> {
        let mut config = self.config();
        config.apply(update);
        self.persist(SYSTEM_CONFIG_KEY, &config)?;
        Ok(config)
    }

    /// Copy every collection, the counters and the configuration
    pub fn backup(&self) -> Snapshot {
        let mut entries = BTreeMap::new();
        for collection in CollectionKey::ALL {
            let key = collection.storage_key();
            entries.insert(key.to_string(), self.read_value(key).unwrap_or(Value::Null));
        }
        for key in [SYSTEM_CONFIG_KEY, COUNTERS_KEY] {
            entries.insert(key.to_string(), self.read_value(key).unwrap_or(Value::Null));
        }
        Snapshot {
            backup_date: Some(Utc::now().to_rfc3339()),
            backup_version: Some(BACKUP_VERSION.to_string()),
            entries,
        }
    }

    /// Replace all state with the contents of `snapshot`.
    ///
    /// A snapshot without both metadata fields is refused before anything is
    /// touched. Null entries are skipped so the freshly seeded value stays.
    pub fn restore(&self, snapshot: &Snapshot) -> bool {
        let missing = snapshot.missing_metadata();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Refusing to restore a backup without its metadata");
            return false;
        }
        if !self.clear() {
            return false;
        }
        for (key, value) in &snapshot.entries {
            if value.is_null() {
                continue;
            }
            self.write(key, value);
        }
        tracing::debug!(
            keys = snapshot.entries.len(),
            backup_date = snapshot.backup_date.as_deref().unwrap_or_default(),
            "Restored backup"
        );
        true
    }

    /// Erase every key and reseed empty collections, counters and configuration
    pub fn clear(&self) -> bool {
        if let Err(e) = self.medium.clear() {
            tracing::error!(error = %e, "Failed to clear storage");
            return false;
        }
        self.seed();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::medium::MemoryMedium;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn partner(name: &str) -> FieldMap {
        fields(&[("name", json!(name)), ("type", json!("customer"))])
    }

    #[test]
    fn test_open_seeds_every_key() {
        let store = RecordStore::open(MemoryMedium::new());
        let keys = store.medium().keys().unwrap();
        assert_eq!(keys.len(), 6);
        assert_eq!(store.counters(), default_counters());
        assert_eq!(store.config(), SystemConfig::default());
    }

    #[test]
    fn test_open_keeps_existing_data() {
        let medium = MemoryMedium::new();
        medium
            .set_item(COUNTERS_KEY, r#"{"customer": 10042}"#)
            .unwrap();
        let store = RecordStore::open(medium);
        assert_eq!(store.next_code(EntityType::Customer).unwrap(), "ANSC-010043");
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let store = RecordStore::open(MemoryMedium::new());
        store
            .medium()
            .set_item("ans_customers", "{broken")
            .unwrap();
        assert_eq!(store.read(CollectionKey::Partners), None);
        assert_eq!(store.stats().customers, 0);
    }

    #[test]
    fn test_first_codes_follow_seeds() {
        let store = RecordStore::open(MemoryMedium::new());
        assert_eq!(store.next_code(EntityType::Customer).unwrap(), "ANSC-010001");
        assert_eq!(store.next_code(EntityType::ExpenseItem).unwrap(), "EXPS-1001");
        assert_eq!(store.next_code(EntityType::PaymentTerm).unwrap(), "PAYT-101");
        assert_eq!(store.next_code(EntityType::LedgerEntry).unwrap(), "LEDG-000002");
    }

    fn fill_to_quota(store: &RecordStore<MemoryMedium>, quota: usize) {
        let used = store.medium().used_bytes();
        let filler = "x".repeat(quota - used - "pad".len());
        store.medium().set_item("pad", &filler).unwrap();
    }

    #[test]
    fn test_next_code_fails_when_counter_cannot_be_persisted() {
        let store = RecordStore::open(MemoryMedium::with_quota(4096));
        store.medium().set_item(COUNTERS_KEY, "{}").unwrap();
        fill_to_quota(&store, 4096);

        assert!(matches!(
            store.next_code(EntityType::Customer),
            Err(AnsError::Persist(_))
        ));
        assert_eq!(store.counters(), CounterTable::new());
    }

    #[test]
    fn test_add_record_rejected_by_quota_leaves_collection() {
        let store = RecordStore::open(MemoryMedium::with_quota(4096));
        fill_to_quota(&store, 4096);

        let result = store.add_record(CollectionKey::Partners, partner("Acme"));
        assert!(matches!(result, Err(AnsError::Persist(_))));
        assert_eq!(store.read(CollectionKey::Partners), Some(vec![]));
    }

    #[test]
    fn test_add_record_rejects_invalid_fields() {
        let store = RecordStore::open(MemoryMedium::new());
        let result = store.add_record(CollectionKey::Partners, fields(&[("name", json!("Acme"))]));
        assert!(matches!(result, Err(AnsError::Validation(_))));
        assert_eq!(store.stats().customers, 0);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let store = RecordStore::open(MemoryMedium::new());
        let result = store
            .update_record(CollectionKey::Partners, "missing", partner("Acme"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_foreign_counter_entry_does_not_reset_others() {
        let medium = MemoryMedium::new();
        medium
            .set_item(
                COUNTERS_KEY,
                r#"{"customer":10005,"expense_item":1002,"legacy":"x"}"#,
            )
            .unwrap();
        let store = RecordStore::open(medium);

        assert_eq!(store.next_code(EntityType::Customer).unwrap(), "ANSC-010006");

        let counters = store.counters();
        assert_eq!(counters["customer"], json!(10006));
        assert_eq!(counters["expense_item"], json!(1002));
        assert_eq!(counters["legacy"], json!("x"));
    }

    #[test]
    fn test_invalid_counter_entry_falls_back_to_seed_alone() {
        let medium = MemoryMedium::new();
        medium
            .set_item(COUNTERS_KEY, r#"{"customer":"many","payment_term":104}"#)
            .unwrap();
        let store = RecordStore::open(medium);

        assert_eq!(store.next_code(EntityType::Customer).unwrap(), "ANSC-010001");
        assert_eq!(store.next_code(EntityType::PaymentTerm).unwrap(), "PAYT-105");
    }

    #[test]
    fn test_exhausted_counter_is_an_error() {
        let medium = MemoryMedium::new();
        medium
            .set_item(COUNTERS_KEY, r#"{"customer":18446744073709551615}"#)
            .unwrap();
        let store = RecordStore::open(medium);

        assert!(matches!(
            store.next_code(EntityType::Customer),
            Err(AnsError::CounterExhausted(_))
        ));
        assert_eq!(store.counters()["customer"], json!(u64::MAX));
    }

    #[test]
    fn test_add_record_rejects_duplicate_code() {
        let store = RecordStore::open(MemoryMedium::new());
        let mut first = partner("Acme");
        first.insert("code".to_string(), json!("ANSC-010001"));
        store.add_record(CollectionKey::Partners, first.clone()).unwrap();

        let result = store.add_record(CollectionKey::Partners, first);
        match result {
            Err(AnsError::Validation(errors)) => assert_eq!(errors[0].field, "code"),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(store.stats().customers, 1);
    }

    #[test]
    fn test_update_missing_id_wins_over_bad_fields() {
        let store = RecordStore::open(MemoryMedium::new());
        let result = store
            .update_record(
                CollectionKey::Partners,
                "missing",
                fields(&[("fax", json!("123"))]),
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_config_merges() {
        let store = RecordStore::open(MemoryMedium::new());
        let config = store
            .update_config(ConfigUpdate {
                currency: Some("USD".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.currency, "USD");
        assert_eq!(store.config().currency, "USD");
        assert_eq!(store.config().date_format, "YYYY-MM-DD");
    }

    #[test]
    fn test_backup_contains_all_keys_and_metadata() {
        let store = RecordStore::open(MemoryMedium::new());
        let snapshot = store.backup();
        assert!(snapshot.is_self_describing());
        assert_eq!(snapshot.backup_version.as_deref(), Some("1.0.0"));
        assert_eq!(snapshot.entries.len(), 6);
        assert_eq!(snapshot.entries["ans_customers"], json!([]));
    }

    #[test]
    fn test_restore_skips_null_entries() {
        let store = RecordStore::open(MemoryMedium::new());
        let mut snapshot = store.backup();
        snapshot
            .entries
            .insert(COUNTERS_KEY.to_string(), Value::Null);
        assert!(store.restore(&snapshot));
        assert_eq!(store.counters(), default_counters());
    }

    #[test]
    fn test_clear_reseeds() {
        let store = RecordStore::open(MemoryMedium::new());
        store.add_record(CollectionKey::Partners, partner("Acme")).unwrap();
        store.next_code(EntityType::Customer).unwrap();

        assert!(store.clear());
        assert_eq!(store.stats(), Stats::default());
        assert_eq!(store.counters(), default_counters());
    }
}
