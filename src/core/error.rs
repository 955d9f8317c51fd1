//! Typed error handling for the list engine
//!
//! Most engine operations never fail: out-of-range navigation and redundant
//! selection changes are silent no-ops. The errors below cover the rest.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: filter values or query input that fail validation
//! - [`SearchError`]: failures of caller-supplied (server-side) search lookups
//! - [`BulkError`]: bulk actions over the selection
//! - [`ExportError`]: export generation and download
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: REST listing requests
//!
//! Operational failures are also reported through `{success: false, error}`
//! results (see [`ActionResult`](crate::list::selection::ActionResult) and
//! [`ExportResult`](crate::list::export::ExportResult)); the messages used
//! there are the `Display` forms of these types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the list engine
#[derive(Debug)]
pub enum ListError {
    /// Input validation errors
    Validation(ValidationError),

    /// Search lookup errors
    Search(SearchError),

    /// Bulk action errors
    Bulk(BulkError),

    /// Export errors
    Export(ExportError),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::Validation(e) => write!(f, "{}", e),
            ListError::Search(e) => write!(f, "{}", e),
            ListError::Bulk(e) => write!(f, "{}", e),
            ListError::Export(e) => write!(f, "{}", e),
            ListError::Config(e) => write!(f, "{}", e),
            ListError::Request(e) => write!(f, "{}", e),
            ListError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListError::Validation(e) => Some(e),
            ListError::Search(e) => Some(e),
            ListError::Bulk(e) => Some(e),
            ListError::Export(e) => Some(e),
            ListError::Config(e) => Some(e),
            ListError::Request(e) => Some(e),
            ListError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ListError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ListError::Validation(_) => StatusCode::BAD_REQUEST,
            ListError::Search(_) => StatusCode::BAD_GATEWAY,
            ListError::Bulk(e) => e.status_code(),
            ListError::Export(e) => e.status_code(),
            ListError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ListError::Request(e) => e.status_code(),
            ListError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ListError::Validation(_) => "VALIDATION_ERROR",
            ListError::Search(_) => "SEARCH_FAILED",
            ListError::Bulk(e) => e.error_code(),
            ListError::Export(e) => e.error_code(),
            ListError::Config(_) => "CONFIG_ERROR",
            ListError::Request(e) => e.error_code(),
            ListError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ListError::Validation(ValidationError::FieldError { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            ListError::Export(ExportError::UnsupportedFormat { format }) => {
                Some(serde_json::json!({
                    "format": format,
                    "supported": ["csv", "json", "excel"]
                }))
            }
            ListError::Request(RequestError::UnknownResource { resource }) => {
                Some(serde_json::json!({ "resource": resource }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// A single field failed a rule
    FieldError { field: String, message: String },

    /// Invalid JSON in a filter expression
    InvalidJson { message: String },

    /// Invalid sort expression (expected `field` or `field:asc|desc`)
    InvalidSort { value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidSort { value } => {
                write!(f, "Invalid sort expression: '{}'", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ListError {
    fn from(err: ValidationError) -> Self {
        ListError::Validation(err)
    }
}

// =============================================================================
// Search Errors
// =============================================================================

/// Errors raised by search lookups
#[derive(Debug)]
pub enum SearchError {
    /// The lookup function rejected
    LookupFailed { query: String, message: String },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::LookupFailed { query, message } => {
                write!(f, "Search for '{}' failed: {}", query, message)
            }
        }
    }
}

impl std::error::Error for SearchError {}

impl From<SearchError> for ListError {
    fn from(err: SearchError) -> Self {
        ListError::Search(err)
    }
}

// =============================================================================
// Bulk Errors
// =============================================================================

/// Errors related to bulk actions over a selection
#[derive(Debug)]
pub enum BulkError {
    /// Nothing is selected
    NoItemsSelected,

    /// The action function rejected
    ActionFailed { message: String },
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkError::NoItemsSelected => write!(f, "No items selected"),
            BulkError::ActionFailed { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for BulkError {}

impl BulkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BulkError::NoItemsSelected => StatusCode::BAD_REQUEST,
            BulkError::ActionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BulkError::NoItemsSelected => "NO_ITEMS_SELECTED",
            BulkError::ActionFailed { .. } => "BULK_ACTION_FAILED",
        }
    }
}

impl From<BulkError> for ListError {
    fn from(err: BulkError) -> Self {
        ListError::Bulk(err)
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors related to exporting records
#[derive(Debug)]
pub enum ExportError {
    /// The requested format is not csv, json or excel
    UnsupportedFormat { format: String },

    /// Export of an empty selection
    NoDataSelected,

    /// Content generation failed
    Serialization { message: String },

    /// The download sink failed to save the file
    DownloadFailed { filename: String, message: String },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::UnsupportedFormat { format } => {
                write!(f, "Unsupported export format: {}", format)
            }
            ExportError::NoDataSelected => write!(f, "No data selected for export"),
            ExportError::Serialization { message } => {
                write!(f, "Failed to generate export: {}", message)
            }
            ExportError::DownloadFailed { filename, message } => {
                write!(f, "Failed to save '{}': {}", filename, message)
            }
        }
    }
}

impl std::error::Error for ExportError {}

impl ExportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExportError::UnsupportedFormat { .. } => StatusCode::BAD_REQUEST,
            ExportError::NoDataSelected => StatusCode::BAD_REQUEST,
            ExportError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ExportError::DownloadFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::UnsupportedFormat { .. } => "UNSUPPORTED_EXPORT_FORMAT",
            ExportError::NoDataSelected => "NO_DATA_SELECTED",
            ExportError::Serialization { .. } => "EXPORT_SERIALIZATION_ERROR",
            ExportError::DownloadFailed { .. } => "EXPORT_DOWNLOAD_FAILED",
        }
    }
}

impl From<ExportError> for ListError {
    fn from(err: ExportError) -> Self {
        ListError::Export(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ListError {
    fn from(err: ConfigError) -> Self {
        ListError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to REST listing requests
#[derive(Debug)]
pub enum RequestError {
    /// No record source registered under this name
    UnknownResource { resource: String },

    /// The data source failed to answer
    SourceFailed { resource: String, message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::UnknownResource { resource } => {
                write!(f, "Unknown resource: {}", resource)
            }
            RequestError::SourceFailed { resource, message } => {
                write!(f, "Failed to load '{}': {}", resource, message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnknownResource { .. } => StatusCode::NOT_FOUND,
            RequestError::SourceFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::UnknownResource { .. } => "UNKNOWN_RESOURCE",
            RequestError::SourceFailed { .. } => "SOURCE_FAILED",
        }
    }
}

impl From<RequestError> for ListError {
    fn from(err: RequestError) -> Self {
        ListError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ListError {
    fn from(err: serde_json::Error) -> Self {
        ListError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ListError {
    fn from(err: std::io::Error) -> Self {
        ListError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ListError {
    fn from(err: serde_yaml::Error) -> Self {
        ListError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Result type alias for list engine operations
pub type ListResult<T> = std::result::Result<T, ListError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_error_message() {
        assert_eq!(BulkError::NoItemsSelected.to_string(), "No items selected");
        let err: ListError = BulkError::NoItemsSelected.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "NO_ITEMS_SELECTED");
    }

    #[test]
    fn test_export_error_messages() {
        let err = ExportError::UnsupportedFormat {
            format: "pdf".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported export format: pdf");
        assert_eq!(
            ExportError::NoDataSelected.to_string(),
            "No data selected for export"
        );
    }

    #[test]
    fn test_unsupported_format_details() {
        let err = ListError::Export(ExportError::UnsupportedFormat {
            format: "pdf".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "UNSUPPORTED_EXPORT_FORMAT");
        let details = response.details.unwrap();
        assert_eq!(details["format"], "pdf");
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::FileNotFound {
            path: "/etc/list.yaml".to_string(),
        };
        assert!(err.to_string().contains("/etc/list.yaml"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let list_err: ListError = json_err.into();
        assert!(matches!(
            list_err,
            ListError::Validation(ValidationError::InvalidJson { .. })
        ));
    }
}
