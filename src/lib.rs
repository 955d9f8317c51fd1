//! # This-List
//!
//! Client-side list processing for admin dashboards: the filter, search, sort,
//! pagination, selection and export logic behind a moderation table, without
//! any UI attached.
//!
//! ## Features
//!
//! - **Pipeline**: records flow Filter → Search → Sort → Pagination
//! - **Typed Records**: ordered field maps with type-aware comparison
//! - **Filter Shapes**: substring, exact, membership and `{min, max}` range filters
//! - **Nulls Last**: null values sort last in both directions
//! - **Safe Navigation**: out-of-range page changes are silent no-ops
//! - **Bulk Actions**: selection tracking with async actions over the selection
//! - **Export**: CSV (RFC 4180 quoting), JSON and a simplified Excel payload
//! - **REST Exposure**: serve any `RecordSource` as a paginated, exportable listing
//! - **Configuration-Based**: engine settings via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_list::prelude::*;
//!
//! let mut table = DataTable::new(EngineConfig::default())
//!     .with_search_fields(["title", "author"])
//!     .with_data(vec![
//!         record! { "id" => 1, "title" => "Great read", "rating" => 5 },
//!         record! { "id" => 2, "title" => "Spoilers!", "rating" => 2 },
//!     ]);
//!
//! table.set_filter("rating", FilterValue::at_least(3));
//! table.sort_by_column("title");
//! let page = table.page_data();
//! ```

pub mod config;
pub mod core;
pub mod list;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ListError, ListResult},
        flag::InFlight,
        query::{ListQuery, ListRequest, PaginatedResponse, PaginationMeta},
        record::{FieldValue, Record, RecordId},
        service::{DownloadSink, RecordSource},
        validation::{FilterRules, ValidationResult, validate_filter},
    };

    // === Macros ===
    pub use crate::record;

    // === Engines ===
    pub use crate::list::{
        ActionResult, CustomField, DataTable, Debounce, ExportFormat, ExportOptions,
        ExportResult, Exporter, FilterSet, FilterValue, Filters, PageItem, Pagination,
        PaginationInfo, Search, Selection, SelectionSummary, Sort, SortDirection, SortSpec,
        apply_filters, apply_sorting, filter_records,
    };

    // === Storage ===
    pub use crate::storage::{FileSystemSink, InMemoryRecordSource, MemorySink};

    // === Config ===
    pub use crate::config::{
        EngineConfig, ExportConfig, HighlightConfig, PaginationConfig, SearchConfig,
    };

    // === Server ===
    pub use crate::server::ListServerBuilder;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
