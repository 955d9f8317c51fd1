//! Client-side list processing engines
//!
//! Records flow Filter → Search → Sort → Pagination. Selection and export
//! operate on the resulting working set. [`DataTable`] composes all of them
//! for one list session.

pub mod export;
pub mod filter;
pub mod pagination;
pub mod search;
pub mod selection;
pub mod sort;
pub mod table;

pub use export::{
    CustomField, ExportFormat, ExportOptions, ExportResult, Exporter, convert_to_csv,
    convert_to_excel, convert_to_json,
};
pub use filter::{FilterSet, FilterValue, Filters, apply_filters, get_filter_options};
pub use pagination::{PageItem, Pagination, PaginationInfo};
pub use search::{Debounce, Search, filter_records};
pub use selection::{ActionResult, Selection, SelectionSummary};
pub use sort::{Sort, SortDirection, SortSpec, apply_sorting};
pub use table::DataTable;
