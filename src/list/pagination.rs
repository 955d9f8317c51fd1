//! Pagination engine
//!
//! Slices a working set into pages and derives display metadata. Out-of-range
//! navigation is a silent no-op: the current page only ever moves to a page
//! that exists, so `1 <= current_page <= max(total_pages, 1)` always holds.

use crate::config::PaginationConfig;
use crate::core::record::Record;
use serde::{Serialize, Serializer};

/// Index range of the current page in the working set (end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIndices {
    pub start_index: usize,
    pub end_index: usize,
}

/// Snapshot of pagination state for display
///
/// `start_index` is 1-based (0 when there are no items); `end_index` is the
/// 1-based index of the last item shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub is_first_page: bool,
    pub is_last_page: bool,
}

/// One entry of a page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(page) => serializer.serialize_u64(*page as u64),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Pagination state owned by one list session
#[derive(Debug, Clone)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_items: usize,
    initial_page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::from_config(&PaginationConfig::default())
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            current_page: 1,
            page_size,
            total_items: 0,
            initial_page_size: page_size,
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.page_size)
    }

    pub fn with_total(mut self, total_items: usize) -> Self {
        self.set_total_items(total_items);
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Update the item count, pulling the current page back into range
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.clamp_current_page();
    }

    pub fn total_pages(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.total_items.div_ceil(self.page_size)
        }
    }

    pub fn page_indices(&self) -> PageIndices {
        let start_index = (self.current_page - 1) * self.page_size;
        PageIndices {
            start_index,
            end_index: (start_index + self.page_size).min(self.total_items),
        }
    }

    /// Slice the current page out of `data`
    pub fn paginate(&self, data: &[Record]) -> Vec<Record> {
        let start = (self.current_page - 1) * self.page_size;
        if start >= data.len() {
            return Vec::new();
        }
        let end = (start + self.page_size).min(data.len());
        data[start..end].to_vec()
    }

    /// Move to `page`; returns whether the page changed
    ///
    /// Pages outside `1..=total_pages` are ignored.
    pub fn go_to_page(&mut self, page: i64) -> bool {
        if page < 1 || page > self.total_pages() as i64 {
            return false;
        }
        self.current_page = page as usize;
        true
    }

    pub fn go_to_next_page(&mut self) -> bool {
        self.go_to_page(self.current_page as i64 + 1)
    }

    pub fn go_to_previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page as i64 - 1)
    }

    pub fn go_to_first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn go_to_last_page(&mut self) {
        self.current_page = self.total_pages().max(1);
    }

    pub fn change_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp_current_page();
        tracing::debug!(page_size = self.page_size, page = self.current_page, "Page size changed");
    }

    /// Jump to the page at `percentage` of the list
    ///
    /// Percentages that land outside the page range leave the page unchanged.
    pub fn jump_to_percentage(&mut self, percentage: f64) -> bool {
        let target = (percentage / 100.0 * self.total_pages() as f64).ceil();
        self.go_to_page(target as i64)
    }

    /// Jump to the page containing the zero-based item `index`
    pub fn jump_to_item(&mut self, index: i64) -> bool {
        let target = (index.saturating_add(1) as f64 / self.page_size as f64).ceil();
        self.go_to_page(target as i64)
    }

    pub fn reset_pagination(&mut self) {
        self.current_page = 1;
        self.page_size = self.initial_page_size;
    }

    pub fn get_pagination_info(&self) -> PaginationInfo {
        let total_pages = self.total_pages();
        let indices = self.page_indices();
        PaginationInfo {
            current_page: self.current_page,
            total_pages,
            page_size: self.page_size,
            total_items: self.total_items,
            start_index: if self.total_items == 0 {
                0
            } else {
                indices.start_index + 1
            },
            end_index: indices.end_index,
            has_next_page: self.current_page < total_pages,
            has_previous_page: self.current_page > 1,
            is_first_page: self.current_page == 1,
            is_last_page: self.current_page >= total_pages.max(1),
        }
    }

    /// Page-number strip centred on the current page
    ///
    /// When the pages don't all fit, the first and last page are always shown
    /// and gaps are marked with [`PageItem::Ellipsis`].
    pub fn get_page_numbers(&self, max_visible: usize) -> Vec<PageItem> {
        let total = self.total_pages();
        let max_visible = max_visible.max(1);
        if total <= max_visible {
            return (1..=total).map(PageItem::Page).collect();
        }

        let half = max_visible / 2;
        let mut start = self.current_page.saturating_sub(half).max(1);
        let end = (start + max_visible - 1).min(total);
        if end + 1 - start < max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }

        let mut items = Vec::with_capacity(max_visible + 4);
        if start > 1 {
            items.push(PageItem::Page(1));
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.extend((start..=end).map(PageItem::Page));
        if end < total {
            if end + 1 < total {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page(total));
        }
        items
    }

    fn clamp_current_page(&mut self) {
        let max_page = self.total_pages().max(1);
        if self.current_page > max_page {
            self.current_page = max_page;
        }
    }
}
