//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Operational failures surface as `{success: false, error}` results

use axum::http::StatusCode;
use axum::response::IntoResponse;
use this_list::core::error::{
    BulkError, ConfigError, ExportError, RequestError, SearchError, ValidationError,
};
use this_list::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_validation_errors_return_400() {
        let err = ListError::Validation(ValidationError::InvalidSort {
            value: "x:up".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_format_returns_400() {
        let err = ListError::Export(ExportError::UnsupportedFormat {
            format: "pdf".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_download_failure_returns_500() {
        let err = ListError::Export(ExportError::DownloadFailed {
            filename: "a.csv".to_string(),
            message: "disk full".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unknown_resource_returns_404() {
        let err = ListError::Request(RequestError::UnknownResource {
            resource: "novels".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_search_failure_returns_502() {
        let err = ListError::Search(SearchError::LookupFailed {
            query: "spoiler".to_string(),
            message: "timeout".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let cases: Vec<(ListError, &str)> = vec![
            (
                ValidationError::InvalidJson {
                    message: "eof".to_string(),
                }
                .into(),
                "VALIDATION_ERROR",
            ),
            (BulkError::NoItemsSelected.into(), "NO_ITEMS_SELECTED"),
            (ExportError::NoDataSelected.into(), "NO_DATA_SELECTED"),
            (
                ConfigError::FileNotFound {
                    path: "engine.yaml".to_string(),
                }
                .into(),
                "CONFIG_ERROR",
            ),
            (
                RequestError::SourceFailed {
                    resource: "reviews".to_string(),
                    message: "down".to_string(),
                }
                .into(),
                "SOURCE_FAILED",
            ),
            (ListError::Internal("boom".to_string()), "INTERNAL_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(err.error_code(), code, "{}", err);
        }
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_response_body_shape() {
        let err = ListError::Validation(ValidationError::FieldError {
            field: "rating".to_string(),
            message: "rating must be at most 5".to_string(),
        });
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["field"], "rating");
        assert!(body["message"].as_str().unwrap().contains("at most 5"));
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let err: ListError = BulkError::NoItemsSelected.into();
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_into_response_status() {
        let err: ListError = ExportError::NoDataSelected.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err: ListError = json_err.into();
        assert!(matches!(
            err,
            ListError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("broken pipe");
        let err: ListError = io_err.into();
        assert!(matches!(err, ListError::Config(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_validation_result_into_error() {
        let rules = FilterRules {
            max: Some(5.0),
            ..Default::default()
        };
        let result = validate_filter("rating", &FieldValue::from(9), &rules);
        let err = result.into_result("rating").unwrap_err();
        assert!(matches!(err, ValidationError::FieldError { ref field, .. } if field == "rating"));
    }
}

// =============================================================================
// Operational Result Tests
// =============================================================================

mod operational_result_tests {
    use super::*;
    use std::sync::Arc;

    /// Sink that refuses every download
    struct FailingSink;

    #[async_trait]
    impl DownloadSink for FailingSink {
        async fn download_file(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Err(anyhow::anyhow!("permission denied"))
        }
    }

    #[tokio::test]
    async fn test_download_failure_is_reported_not_raised() {
        let mut exporter = Exporter::new(Arc::new(FailingSink));
        let data = vec![record! { "id" => 1 }];
        let result = exporter
            .export_data(&data, "json", ExportOptions::new().filename("x"))
            .await;

        assert!(!result.success);
        let message = result.error.unwrap();
        assert!(message.contains("x.json"));
        assert!(message.contains("permission denied"));
        assert_eq!(exporter.error(), Some(message.as_str()));
    }

    #[tokio::test]
    async fn test_search_failure_is_rethrown_and_recorded() {
        let mut search = Search::default();
        let outcome = search
            .search("spoiler", |_| async { Err(anyhow::anyhow!("timeout")) })
            .await;

        assert!(outcome.is_err());
        assert_eq!(search.error(), Some("Search for 'spoiler' failed: timeout"));
        assert!(search.history().is_empty());
        search.clear_error();
        assert!(search.error().is_none());
    }

    #[test]
    fn test_out_of_range_navigation_is_not_an_error() {
        let mut table = DataTable::default().with_data(vec![record! { "id" => 1 }]);
        assert!(!table.go_to_page(7));
        table.selection_mut().deselect_item(42);
        assert!(table.selection().error().is_none());
        assert_eq!(table.pagination().current_page(), 1);
    }
}
