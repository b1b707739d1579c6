//! Record management use cases: create, edit, delete, browse

use crate::domain::{CollectionKey, Criteria, FieldMap, Record, SortOrder};
use crate::error::{AnsError, FieldError, Result};
use crate::infrastructure::{Medium, RecordStore};
use serde_json::Value;

/// Parse `KEY=VALUE` arguments into a field map.
///
/// Values are kept as text; the collection schema coerces them later.
pub fn parse_assignments(args: &[String]) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    let mut errors = Vec::new();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                fields.insert(key.trim().to_string(), Value::String(value.to_string()));
            }
            _ => errors.push(FieldError::new(arg, "expected KEY=VALUE")),
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(AnsError::Validation(errors))
    }
}

/// Search, sort and paging options for a list view
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: String,
    pub order: SortOrder,
    /// 1-based; clamped to the available pages
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            search: None,
            sort_by: "code".to_string(),
            order: SortOrder::Asc,
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of a list view
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Manages the records of one collection through the store
pub struct RecordService<'a, M: Medium> {
    store: &'a RecordStore<M>,
    collection: CollectionKey,
}

impl<'a, M: Medium> RecordService<'a, M> {
    pub fn new(store: &'a RecordStore<M>, collection: CollectionKey) -> Self {
        RecordService { store, collection }
    }

    fn not_found(&self, id: &str) -> AnsError {
        AnsError::RecordNotFound {
            collection: self.collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Create a record under the next code of the collection's sequence.
    ///
    /// Codes are only ever issued here; a caller-supplied `code` is rejected.
    /// An issued code stays consumed even if the record is then rejected.
    pub fn create(&self, mut fields: FieldMap) -> Result<Record> {
        if fields.contains_key("code") {
            return Err(AnsError::Validation(vec![FieldError::new(
                "code",
                "is issued automatically",
            )]));
        }
        let code = self.store.next_code(self.collection.entity_type())?;
        fields.insert("code".to_string(), Value::String(code));
        self.store.add_record(self.collection, fields)
    }

    pub fn update(&self, id: &str, fields: FieldMap) -> Result<Record> {
        self.store
            .update_record(self.collection, id, fields)?
            .ok_or_else(|| self.not_found(id))
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_record(self.collection, id)? {
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    pub fn show(&self, id: &str) -> Result<Record> {
        self.store
            .find_records(self.collection, &Criteria::new().with("id", id))
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(id))
    }

    pub fn find(&self, criteria: &Criteria) -> Vec<Record> {
        self.store.find_records(self.collection, criteria)
    }

    /// Free-text search over the collection's search fields, then sort, then page
    pub fn list(&self, query: &ListQuery) -> Page {
        let mut records = self
            .store
            .sort_records(self.collection, &query.sort_by, query.order);

        if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
            let needle = term.trim().to_lowercase();
            let fields = self.collection.search_fields();
            records.retain(|record| {
                fields.iter().any(|field| {
                    record
                        .get_text(field)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            });
        }

        let page_size = query.page_size.max(1);
        let total_items = records.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = query.page.clamp(1, total_pages);

        let items = records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Page {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}
