//! REST exposure for registered record sources
//!
//! Each source registered under a name gets a paginated listing route and an
//! export route. Query parameters use the same filter/sort/search shapes as
//! the client-side engines.

use crate::config::EngineConfig;
use crate::core::error::{ExportError, ListError, RequestError};
use crate::core::query::{ListQuery, ListRequest, PaginatedResponse};
use crate::core::record::Record;
use crate::core::service::RecordSource;
use crate::list::export::{self, CustomField, ExportFormat, ExportOptions};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct ListState {
    pub sources: Arc<HashMap<String, Arc<dyn RecordSource>>>,
    pub config: Arc<EngineConfig>,
}

impl ListState {
    fn source(&self, resource: &str) -> Result<Arc<dyn RecordSource>, ListError> {
        self.sources.get(resource).cloned().ok_or_else(|| {
            RequestError::UnknownResource {
                resource: resource.to_string(),
            }
            .into()
        })
    }
}

/// Query parameters of the export route
///
/// # Example
/// ```text
/// GET /reviews/export?format=json&filter={"status":"flagged"}&fields=id,title
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ExportQuery {
    /// `csv`, `json` or `excel` (default `csv`)
    #[serde(default = "default_format")]
    pub format: String,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    /// File name without extension
    pub filename: Option<String>,
    /// Comma-separated column list
    pub fields: Option<String>,
}

fn default_format() -> String {
    "csv".to_string()
}

impl ExportQuery {
    fn to_request(&self) -> Result<ListRequest, ListError> {
        let query = ListQuery {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            search: self.search.clone(),
            ..Default::default()
        };
        Ok(query.into_request()?)
    }

    fn to_options(&self) -> ExportOptions {
        let mut options = ExportOptions::new();
        if let Some(name) = &self.filename {
            options = options.filename(name.replace(['"', '/', '\\'], "_"));
        }
        if let Some(fields) = &self.fields {
            let columns: Vec<CustomField> = fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(CustomField::key)
                .collect();
            if !columns.is_empty() {
                options.custom_fields = Some(columns);
            }
        }
        options
    }
}

/// REST API exposure
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - `GET /{resource}` listing routes
    /// - `GET /{resource}/export` export routes
    /// - Custom routes
    pub fn build_router(state: ListState, custom_routes: Vec<Router>) -> Router {
        let resource_routes = Router::new()
            .route("/{resource}", get(list_records))
            .route("/{resource}/export", get(export_records))
            .with_state(state);

        let mut app = Self::health_routes();
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }
        app.merge(resource_routes)
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/healthz", get(health_check))
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "this-list"
    }))
}

/// List one page of a resource
///
/// `GET /{resource}?page=&limit=&filter=&sort=&search=`
pub async fn list_records(
    State(state): State<ListState>,
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<Record>>, ListError> {
    let source = state.source(&resource)?;
    let request = query.into_request()?;

    let page = source.fetch(&request).await.map_err(|e| {
        tracing::warn!(resource = %resource, error = %e, "Record source failed");
        RequestError::SourceFailed {
            resource: resource.clone(),
            message: e.to_string(),
        }
    })?;
    Ok(Json(page))
}

/// Export a resource's whole working set as a file
///
/// `GET /{resource}/export?format=&filter=&sort=&search=&filename=&fields=`
pub async fn export_records(
    State(state): State<ListState>,
    Path(resource): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ListError> {
    let format: ExportFormat = query.format.parse().map_err(ExportError::from)?;
    let source = state.source(&resource)?;
    let request = query.to_request()?;

    let records = source.fetch_all(&request).await.map_err(|e| {
        tracing::warn!(resource = %resource, error = %e, "Record source failed");
        RequestError::SourceFailed {
            resource: resource.clone(),
            message: e.to_string(),
        }
    })?;

    let options = query.to_options();
    let rendered = export::render(&records, format, &options, &state.config.export)?;
    let filename = options.resolve_filename(format);

    tracing::debug!(
        resource = %resource,
        format = %format,
        records = records.len(),
        "Export served"
    );
    let headers = [
        (header::CONTENT_TYPE, rendered.mime_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, rendered.content).into_response())
}
