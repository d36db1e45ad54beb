use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::data::record::Record;
use crate::data::record_exporter::{ExportSpec, RecordExporter};
use crate::data::record_filter::{FilterSpec, RecordFilter};
use crate::data::value_compare::compare_values;

/// Fixed page-size option set offered by the pagination controls.
pub const PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A filterable, sortable, paginated view over an immutable record
/// collection.
///
/// The pipeline is one-directional: collection -> filter -> sort ->
/// paginate. Derived index vectors are recomputed eagerly whenever an
/// input changes; the source collection itself is never reordered or
/// mutated. Export always operates on the filtered, pre-sort subset.
pub struct TableView {
    source: Arc<Vec<Record>>,

    search_query: String,
    search_field: String,
    additional_search_fields: Vec<String>,
    active_filters: BTreeMap<String, String>,

    sort_field: Option<String>,
    sort_direction: SortDirection,

    current_page: usize,
    page_size: usize,

    /// Records passing filters + search, in collection order.
    filtered: Vec<usize>,
    /// Filtered indices under the active sort.
    sorted: Vec<usize>,

    export_in_flight: bool,
}

impl TableView {
    pub fn new(source: Arc<Vec<Record>>, search_field: impl Into<String>) -> Self {
        let mut view = Self {
            source,
            search_query: String::new(),
            search_field: search_field.into(),
            additional_search_fields: Vec::new(),
            active_filters: BTreeMap::new(),
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            current_page: 0,
            page_size: 10,
            filtered: Vec::new(),
            sorted: Vec::new(),
            export_in_flight: false,
        };
        view.recompute();
        view
    }

    pub fn with_additional_search_fields(mut self, fields: Vec<String>) -> Self {
        self.additional_search_fields = fields;
        self.recompute();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.set_page_size(page_size);
        self
    }

    /// Replace the collection wholesale. The previous derived state is
    /// discarded and rebuilt against the new snapshot.
    pub fn set_collection(&mut self, source: Arc<Vec<Record>>) {
        self.source = source;
        self.recompute();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.recompute();
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    /// Set one field filter. An empty value or "all" removes the
    /// constraint for that field; at most one value is active per field.
    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            self.active_filters.remove(&field);
        } else {
            self.active_filters.insert(field, value);
        }
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.active_filters.clear();
        self.recompute();
    }

    /// Toggle sort on a field: a new field sorts ascending, the active
    /// field flips direction.
    pub fn toggle_sort(&mut self, field: impl Into<String>) {
        let field = field.into();
        match &self.sort_field {
            Some(active) if *active == field => {
                self.sort_direction = self.sort_direction.flipped();
            }
            _ => {
                self.sort_field = Some(field);
                self.sort_direction = SortDirection::Ascending;
            }
        }
        self.recompute();
    }

    pub fn clear_sort(&mut self) {
        self.sort_field = None;
        self.sort_direction = SortDirection::Ascending;
        self.recompute();
    }

    pub fn first_page(&mut self) {
        self.current_page = 0;
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        self.current_page = (self.current_page + 1).min(self.total_pages() - 1);
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages() - 1;
    }

    /// Jump to a zero-based page, clamped into the current bounds.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages() - 1);
    }

    /// Change the page size. Only values from PAGE_SIZES are accepted;
    /// anything else is ignored with a warning. A successful change
    /// resets the view to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if !PAGE_SIZES.contains(&page_size) {
            warn!("rejected page size {}; allowed: {:?}", page_size, PAGE_SIZES);
            return false;
        }
        self.page_size = page_size;
        self.current_page = 0;
        true
    }

    /// Option set for a filter: the explicit list when the spec carries
    /// one, otherwise the distinct values across the whole unfiltered
    /// collection.
    pub fn filter_options(&self, spec: &FilterSpec) -> Vec<String> {
        match &spec.options {
            Some(options) => options.clone(),
            None => RecordFilter::distinct_options(&self.source, &spec.field),
        }
    }

    /// Export the filtered subset through the given spec, with the
    /// default field-resolving row mapper.
    pub fn export(&mut self, spec: Option<&ExportSpec>) -> Result<PathBuf> {
        match spec {
            Some(spec) => {
                let mapper = RecordExporter::default_row_mapper(spec);
                self.export_with(spec, &mapper)
            }
            None => Err(anyhow!("no export target configured for this view")),
        }
    }

    /// Export the filtered subset with a caller-supplied row mapper.
    ///
    /// A single export may be in flight at a time; a second request is
    /// rejected, never queued. The in-flight flag is cleared on both
    /// success and failure so the operation stays retryable.
    pub fn export_with(
        &mut self,
        spec: &ExportSpec,
        mapper: &dyn Fn(&Record) -> HashMap<String, String>,
    ) -> Result<PathBuf> {
        if self.export_in_flight {
            return Err(anyhow!("an export is already in progress"));
        }
        self.export_in_flight = true;
        let result = RecordExporter::export_csv(&self.filtered_records(), spec, mapper);
        self.export_in_flight = false;
        result
    }

    pub fn is_export_in_flight(&self) -> bool {
        self.export_in_flight
    }

    /// Records on the current page, in sorted order.
    pub fn page_records(&self) -> Vec<&Record> {
        let start = self.current_page * self.page_size;
        self.sorted
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&index| &self.source[index])
            .collect()
    }

    /// Every record passing the current filters and search, in
    /// collection order (pre-sort). This is the export subset.
    pub fn filtered_records(&self) -> Vec<&Record> {
        self.filtered
            .iter()
            .map(|&index| &self.source[index])
            .collect()
    }

    /// Filtered records in sorted order.
    pub fn sorted_records(&self) -> Vec<&Record> {
        self.sorted
            .iter()
            .map(|&index| &self.source[index])
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn source_count(&self) -> usize {
        self.source.len()
    }

    pub fn total_pages(&self) -> usize {
        ((self.filtered.len() + self.page_size - 1) / self.page_size).max(1)
    }

    /// Zero-based; rendered as current_page + 1.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    pub fn active_filters(&self) -> &BTreeMap<String, String> {
        &self.active_filters
    }

    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort_field
            .as_deref()
            .map(|field| (field, self.sort_direction))
    }

    fn recompute(&mut self) {
        self.filtered = RecordFilter::filter_indices(
            &self.source,
            &self.search_query,
            &self.search_field,
            &self.additional_search_fields,
            &self.active_filters,
        );

        let mut sorted = self.filtered.clone();
        if let Some(field) = self.sort_field.clone() {
            let source = Arc::clone(&self.source);
            let direction = self.sort_direction;
            // Sort reads the top-level field directly; it does not fan
            // out through the resolver. Vec::sort_by is stable, so
            // non-comparable keys keep their filter-pass order.
            sorted.sort_by(|&a, &b| {
                let ordering = compare_values(source[a].field(&field), source[b].field(&field));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        self.sorted = sorted;

        // A shrinking result set must not leave the view pointing past
        // the last page.
        let max_page = self.total_pages() - 1;
        if self.current_page > max_page {
            debug!(
                "clamping page {} to {} after recompute",
                self.current_page, max_page
            );
            self.current_page = max_page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Arc<Vec<Record>> {
        Arc::new(vec![
            Record::new("1", json!({"name": "Jean", "age": 41, "city": "Bamako"})),
            Record::new("2", json!({"name": "Awa", "age": 29, "city": "Segou"})),
            Record::new("3", json!({"name": "Moussa", "age": 35, "city": "Bamako"})),
            Record::new("4", json!({"name": "Fatou", "age": 29, "city": "Mopti"})),
        ])
    }

    #[test]
    fn test_new_view_shows_all_records() {
        let view = TableView::new(people(), "name");
        assert_eq!(view.filtered_count(), 4);
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.page_records().len(), 4);
    }

    #[test]
    fn test_search_narrows_and_clears() {
        let mut view = TableView::new(people(), "name");
        view.set_search("JEAN");
        assert_eq!(view.filtered_count(), 1);
        assert_eq!(view.page_records()[0].id(), "1");

        view.clear_search();
        assert_eq!(view.filtered_count(), 4);
    }

    #[test]
    fn test_filter_all_removes_constraint() {
        let mut view = TableView::new(people(), "name");
        view.set_filter("city", "Bamako");
        assert_eq!(view.filtered_count(), 2);

        view.set_filter("city", "All");
        assert_eq!(view.filtered_count(), 4);
    }

    #[test]
    fn test_sort_ascending_then_toggle() {
        let mut view = TableView::new(people(), "name");
        view.toggle_sort("age");
        let ages: Vec<i64> = view
            .sorted_records()
            .iter()
            .map(|r| r.field("age").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ages, vec![29, 29, 35, 41]);

        view.toggle_sort("age");
        let ages: Vec<i64> = view
            .sorted_records()
            .iter()
            .map(|r| r.field("age").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ages, vec![41, 35, 29, 29]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let mut view = TableView::new(people(), "name");
        view.toggle_sort("age");
        let first_two: Vec<&str> = view
            .sorted_records()
            .iter()
            .take(2)
            .map(|r| r.id())
            .collect();
        // Awa (id 2) precedes Fatou (id 4) in collection order; both are 29
        assert_eq!(first_two, vec!["2", "4"]);
    }

    #[test]
    fn test_new_sort_field_resets_to_ascending() {
        let mut view = TableView::new(people(), "name");
        view.toggle_sort("age");
        view.toggle_sort("age");
        assert_eq!(
            view.sort_state(),
            Some(("age", SortDirection::Descending))
        );

        view.toggle_sort("name");
        assert_eq!(view.sort_state(), Some(("name", SortDirection::Ascending)));
    }

    #[test]
    fn test_export_subset_ignores_sort_and_page() {
        let mut view = TableView::new(people(), "name").with_page_size(5);
        view.toggle_sort("age");
        let exported: Vec<&str> = view.filtered_records().iter().map(|r| r.id()).collect();
        // Collection order, not sorted order
        assert_eq!(exported, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_page_size_rejects_values_outside_option_set() {
        let mut view = TableView::new(people(), "name");
        assert!(!view.set_page_size(7));
        assert_eq!(view.page_size(), 10);
        assert!(view.set_page_size(5));
        assert_eq!(view.page_size(), 5);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let records: Vec<Record> = (0..30)
            .map(|i| Record::new(i.to_string(), json!({"name": format!("r{i}")})))
            .collect();
        let mut view = TableView::new(Arc::new(records), "name").with_page_size(5);
        view.last_page();
        assert_eq!(view.current_page(), 5);

        view.set_page_size(10);
        assert_eq!(view.current_page(), 0);
        assert_eq!(view.total_pages(), 3);
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let mut view = TableView::new(people(), "name").with_page_size(5);
        view.prev_page();
        assert_eq!(view.current_page(), 0);
        view.next_page();
        assert_eq!(view.current_page(), 0);
        view.set_page(99);
        assert_eq!(view.current_page(), 0);
    }

    #[test]
    fn test_empty_result_still_reports_one_page() {
        let mut view = TableView::new(people(), "name");
        view.set_search("zzz");
        assert_eq!(view.filtered_count(), 0);
        assert_eq!(view.total_pages(), 1);
        assert!(view.page_records().is_empty());
    }

    #[test]
    fn test_export_without_spec_is_an_error() {
        let mut view = TableView::new(people(), "name");
        let err = view.export(None).unwrap_err();
        assert!(err.to_string().contains("no export target"));
        assert!(!view.is_export_in_flight());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let source = people();
        let mut view = TableView::new(Arc::clone(&source), "name");
        view.set_filter("city", "Bamako");
        view.toggle_sort("age");
        let first: Vec<String> = view.sorted_records().iter().map(|r| r.id().to_string()).collect();

        // Re-running the pipeline on unchanged inputs changes nothing
        view.set_filter("city", "Bamako");
        let second: Vec<String> = view.sorted_records().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(first, second);

        // And the source collection is untouched
        let ids: Vec<&str> = source.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
