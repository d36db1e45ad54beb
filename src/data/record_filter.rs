use std::collections::{BTreeMap, HashSet};

use crate::data::field_path;
use crate::data::record::Record;

/// One dropdown-style field filter offered to the view.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub label: String,
    /// Dotted path; may fan out through arrays.
    pub field: String,
    /// Explicit option set; derived from the collection when absent.
    pub options: Option<Vec<String>>,
}

impl FilterSpec {
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Pure filter and search evaluation over a record collection.
pub struct RecordFilter;

impl RecordFilter {
    /// True when every active (field, value) pair matches the record:
    /// some value resolved from the field equals the filter value,
    /// case-insensitively. Distinct filter fields compose with AND.
    pub fn matches_filters(record: &Record, active: &BTreeMap<String, String>) -> bool {
        active.iter().all(|(field, value)| {
            if value.is_empty() {
                return true;
            }
            let wanted = value.to_lowercase();
            field_path::resolve_text(record.fields(), field)
                .iter()
                .any(|v| v.to_lowercase() == wanted)
        })
    }

    /// True when the query is a case-insensitive substring of any value
    /// resolved from the primary search field or any additional field.
    /// An empty query matches everything.
    pub fn matches_search(
        record: &Record,
        query: &str,
        search_field: &str,
        additional_fields: &[String],
    ) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        std::iter::once(search_field)
            .chain(additional_fields.iter().map(String::as_str))
            .any(|field| {
                field_path::resolve_text(record.fields(), field)
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            })
    }

    /// Indices of records passing all active filters and the search, in
    /// collection order.
    pub fn filter_indices(
        records: &[Record],
        query: &str,
        search_field: &str,
        additional_fields: &[String],
        active: &BTreeMap<String, String>,
    ) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                Self::matches_filters(record, active)
                    && Self::matches_search(record, query, search_field, additional_fields)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Distinct non-empty values for a filter field, drawn from the whole
    /// unfiltered collection in first-appearance order.
    ///
    /// Deliberately never derived from the filtered subset: selecting one
    /// filter must not prune another filter's option list.
    pub fn distinct_options(records: &[Record], field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut options = Vec::new();
        for record in records {
            for text in field_path::resolve_text(record.fields(), field) {
                if text.is_empty() {
                    continue;
                }
                if seen.insert(text.clone()) {
                    options.push(text);
                }
            }
        }
        options
    }
}
