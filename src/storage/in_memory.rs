//! In-memory implementation of RecordSource for testing and development

use crate::config::SearchConfig;
use crate::core::query::{ListRequest, PaginatedResponse, PaginationMeta};
use crate::core::record::Record;
use crate::core::service::RecordSource;
use crate::list::filter::apply_filters;
use crate::list::search::filter_records;
use crate::list::sort::apply_sorting;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory record source
///
/// Runs the same filter → search → sort pipeline as the client-side engines,
/// so a server-side listing answers exactly what a local table would show.
/// Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryRecordSource {
    records: Arc<RwLock<Vec<Record>>>,
    search_fields: Vec<String>,
    search: SearchConfig,
}

impl InMemoryRecordSource {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            search_fields: Vec::new(),
            search: SearchConfig::default(),
        }
    }

    /// Restrict free-text search to these fields (default: every string field)
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    pub fn insert(&self, record: Record) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.push(record);
        Ok(())
    }

    pub fn replace_all(&self, replacement: Vec<Record>) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        *records = replacement;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.clone())
    }

    fn working_set(&self, request: &ListRequest) -> Result<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let filtered = apply_filters(&records, &request.filters, None);
        let searched = match request.search.as_deref() {
            Some(query) => filter_records(&filtered, query, &self.search_fields, &self.search),
            None => filtered,
        };
        Ok(apply_sorting(
            &searched,
            request.sort.field.as_deref(),
            request.sort.direction,
        ))
    }
}

impl Default for InMemoryRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch(&self, request: &ListRequest) -> Result<PaginatedResponse<Record>> {
        let working = self.working_set(request)?;
        let limit = request.limit.max(1);
        let page = request.page.max(1);
        let total = working.len();

        let data = working
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        tracing::debug!(page = page, limit = limit, total = total, "Fetched records");
        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(page, limit, total),
        })
    }

    async fn fetch_all(&self, request: &ListRequest) -> Result<Vec<Record>> {
        self.working_set(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::filter::{FilterSet, FilterValue};
    use crate::list::sort::SortSpec;
    use crate::record;

    fn source() -> InMemoryRecordSource {
        InMemoryRecordSource::with_records(vec![
            record! { "id" => 1, "name" => "Bob", "age" => 30 },
            record! { "id" => 2, "name" => "Al", "age" => 25 },
            record! { "id" => 3, "name" => "Cy", "age" => 35 },
            record! { "id" => 4, "name" => "Dee", "age" => 28 },
        ])
        .with_search_fields(["name"])
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.value("name").to_text()).collect()
    }

    #[tokio::test]
    async fn test_fetch_runs_pipeline() {
        let request = ListRequest {
            filters: FilterSet::new().with("age", FilterValue::at_least(26)),
            sort: SortSpec::asc("name"),
            ..ListRequest::new(1, 2)
        };
        let page = source().fetch(&request).await.unwrap();
        assert_eq!(names(&page.data), vec!["Bob", "Cy"]);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next);
    }

    #[tokio::test]
    async fn test_fetch_all_ignores_pagination() {
        let request = ListRequest {
            search: Some("e".to_string()),
            ..ListRequest::new(1, 1)
        };
        let all = source().fetch_all(&request).await.unwrap();
        assert_eq!(names(&all), vec!["Dee"]);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let page = source().fetch(&ListRequest::new(9, 10)).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 4);
    }

    #[tokio::test]
    async fn test_huge_page_is_empty() {
        let page = source()
            .fetch(&ListRequest::new(usize::MAX, 100))
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 4);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn test_insert_and_replace() {
        let source = InMemoryRecordSource::new();
        source.insert(record! { "id" => 1 }).unwrap();
        assert_eq!(source.list().unwrap().len(), 1);
        source.replace_all(Vec::new()).unwrap();
        assert!(source.list().unwrap().is_empty());
    }
}
