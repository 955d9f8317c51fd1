//! Service traits for the collaborators a list session talks to

use crate::core::query::{ListRequest, PaginatedResponse};
use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;

/// Supplies records to a list session
///
/// Implementations may do the work server-side (SQL, a remote API) or, like
/// [`crate::storage::InMemoryRecordSource`], run the same filter/search/sort
/// pipeline the client-side engines use. The framework is agnostic to where
/// the records live.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of records matching the request
    async fn fetch(&self, request: &ListRequest) -> Result<PaginatedResponse<Record>>;

    /// Fetch every record matching the request, ignoring pagination
    ///
    /// Used by exports, which always cover the whole working set.
    async fn fetch_all(&self, request: &ListRequest) -> Result<Vec<Record>>;
}

/// Saves generated export content somewhere the user can get at it
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn download_file(&self, content: &str, filename: &str, mime_type: &str) -> Result<()>;
}
