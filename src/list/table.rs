//! Composite data table
//!
//! Wires the engines together for one list session: raw records flow through
//! Filter → Search → Sort to form the working set, which Pagination slices
//! and Selection tracks.

use crate::config::EngineConfig;
use crate::core::record::Record;
use crate::list::export::{ExportOptions, ExportResult, Exporter};
use crate::list::filter::{CustomFilter, FilterSet, FilterValue, Filters};
use crate::list::pagination::{PageItem, Pagination, PaginationInfo};
use crate::list::search::Search;
use crate::list::selection::Selection;
use crate::list::sort::{Sort, SortSpec};

/// One list session: a collection plus its filter, search, sort, page and
/// selection state
///
/// The working set is recomputed after every mutation. Filter and search
/// changes go back to page 1; sort changes and data replacement keep the
/// current page when it still exists.
#[derive(Debug, Clone)]
pub struct DataTable {
    config: EngineConfig,
    data: Vec<Record>,
    filters: Filters,
    search: Search,
    search_fields: Vec<String>,
    sort: Sort,
    pagination: Pagination,
    selection: Selection,
    working: Vec<Record>,
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DataTable {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            filters: Filters::new(),
            search: Search::from_config(&config),
            search_fields: Vec::new(),
            sort: Sort::new(),
            pagination: Pagination::from_config(&config.pagination),
            selection: Selection::from_config(&config),
            data: Vec::new(),
            working: Vec::new(),
            config,
        }
    }

    pub fn with_data(mut self, data: Vec<Record>) -> Self {
        self.set_data(data);
        self
    }

    /// Restrict free-text search to these fields (default: every string field)
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self.refresh();
        self
    }

    /// Start with a filter set that `reset_filters` comes back to
    pub fn with_initial_filters(mut self, initial: FilterSet) -> Self {
        self.filters = Filters::with_initial(initial);
        self.refresh();
        self
    }

    pub fn with_custom_filter(mut self, custom: CustomFilter) -> Self {
        self.filters = self.filters.with_custom(custom);
        self.refresh();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// Replace the collection; state other than the data is kept
    pub fn set_data(&mut self, data: Vec<Record>) {
        tracing::debug!(records = data.len(), "Table data replaced");
        self.data = data;
        self.refresh();
    }

    // === Filter ===

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.filters.set_filter(key, value);
        self.restart();
    }

    pub fn set_multiple_filters(&mut self, partial: FilterSet) {
        self.filters.set_multiple_filters(partial);
        self.restart();
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.filters.clear_filter(key);
        self.restart();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all_filters();
        self.restart();
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset_filters();
        self.restart();
    }

    // === Search ===

    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Search state for history, suggestions and async lookups
    ///
    /// Changing the query through this handle does not refresh the working
    /// set; use [`DataTable::set_search_query`] for that.
    pub fn search_mut(&mut self) -> &mut Search {
        &mut self.search
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search.set_query(query);
        self.restart();
    }

    pub fn clear_search(&mut self) {
        self.search.clear_search();
        self.restart();
    }

    /// Suggestions for the current query drawn from the whole collection
    pub fn suggestions(&self, max_count: usize) -> Vec<String> {
        self.search
            .get_suggestions(&self.data, &self.search_fields, max_count)
    }

    // === Sort ===

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn sort_by_column(&mut self, field: &str) {
        self.sort.sort_by_column(field);
        self.refresh();
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort.set_sort(spec);
        self.refresh();
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear_sort();
        self.refresh();
    }

    // === Pagination ===

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn go_to_page(&mut self, page: i64) -> bool {
        self.pagination.go_to_page(page)
    }

    pub fn go_to_next_page(&mut self) -> bool {
        self.pagination.go_to_next_page()
    }

    pub fn go_to_previous_page(&mut self) -> bool {
        self.pagination.go_to_previous_page()
    }

    pub fn go_to_first_page(&mut self) {
        self.pagination.go_to_first_page();
    }

    pub fn go_to_last_page(&mut self) {
        self.pagination.go_to_last_page();
    }

    pub fn change_page_size(&mut self, page_size: usize) {
        self.pagination.change_page_size(page_size);
    }

    pub fn pagination_info(&self) -> PaginationInfo {
        self.pagination.get_pagination_info()
    }

    /// Page strip sized by the configured `max_visible_pages`
    pub fn page_numbers(&self) -> Vec<PageItem> {
        self.pagination
            .get_page_numbers(self.config.pagination.max_visible_pages)
    }

    // === Selection ===

    /// Selection over the working set
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    // === Derived data ===

    /// Filtered, searched and sorted records, before pagination
    pub fn working_set(&self) -> &[Record] {
        &self.working
    }

    /// Records on the current page
    pub fn page_data(&self) -> Vec<Record> {
        self.pagination.paginate(&self.working)
    }

    pub async fn export_working_set(
        &self,
        exporter: &mut Exporter,
        format: &str,
        options: ExportOptions,
    ) -> ExportResult {
        exporter.export_data(&self.working, format, options).await
    }

    pub async fn export_selection(
        &self,
        exporter: &mut Exporter,
        format: &str,
        options: ExportOptions,
    ) -> ExportResult {
        exporter
            .export_selected(&self.selection.selected_data(), format, options)
            .await
    }

    fn restart(&mut self) {
        self.pagination.go_to_first_page();
        self.refresh();
    }

    fn refresh(&mut self) {
        let filtered = self.filters.apply(&self.data);
        let searched = if self.search.is_active() {
            self.search
                .filter_data(&filtered, self.search.query(), &self.search_fields)
        } else {
            filtered
        };
        self.working = self.sort.apply(&searched);
        self.pagination.set_total_items(self.working.len());
        self.selection.set_data(self.working.clone());
        self.selection.retain_present();
    }
}
