//! Query parameters and pagination utilities

use crate::core::error::ValidationError;
use crate::list::filter::FilterSet;
use crate::list::sort::SortSpec;
use serde::{Deserialize, Serialize};

/// Query parameters for listing records
///
/// This structure is used to extract pagination, filtering, sorting and search
/// parameters from URL query strings. All parameters have sensible defaults.
///
/// # Example
/// ```text
/// GET /reviews?page=2&limit=10
/// GET /reviews?filter={"status": "pending", "rating": {"min": 3}}
/// GET /reviews?search=spoiler&sort=created_at:desc
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    pub page: usize,

    /// Number of items per page
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Filter set as a JSON object
    ///
    /// # Format
    /// - Substring / exact match: `{"status": "pending"}`, `{"rating": 5}`
    /// - Membership: `{"status": ["pending", "flagged"]}`
    /// - Range: `{"rating": {"min": 2, "max": 4}}`
    pub filter: Option<String>,

    /// Sort field and direction (`field`, `field:asc` or `field:desc`)
    pub sort: Option<String>,

    /// Free-text search query
    pub search: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            filter: None,
            sort: None,
            search: None,
        }
    }
}

impl ListQuery {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, ensuring it doesn't exceed the maximum
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100) // Maximum 100 per page, minimum 1
    }

    /// Parse the filter JSON into a filter set
    pub fn filter_set(&self) -> Result<FilterSet, ValidationError> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(FilterSet::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson {
                message: e.to_string(),
            }),
        }
    }

    /// Parse the sort expression
    pub fn sort_spec(&self) -> Result<SortSpec, ValidationError> {
        match self.sort.as_deref() {
            None => Ok(SortSpec::none()),
            Some(expr) => SortSpec::parse(expr),
        }
    }

    /// Validate and resolve into a typed request
    pub fn into_request(self) -> Result<ListRequest, ValidationError> {
        Ok(ListRequest {
            page: self.page(),
            limit: self.limit(),
            filters: self.filter_set()?,
            sort: self.sort_spec()?,
            search: self.search.filter(|s| !s.is_empty()),
        })
    }
}

/// A validated listing request, as handed to record sources
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub page: usize,
    pub limit: usize,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub search: Option<String>,
}

impl ListRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            ..Default::default()
        }
    }
}

/// Paginated response structure
///
/// This structure wraps paginated data with metadata about pagination state.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}
