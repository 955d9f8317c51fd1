//! End-to-end tests of the REST exposure
//!
//! These tests verify the complete flow from HTTP request to response for
//! paginated listings and exports.

use anyhow::Result;
use axum::http::header;
use axum_test::TestServer;
use serde_json::{Value, json};
use this_list::prelude::*;

// =============================================================================
// Test Setup
// =============================================================================

fn reviews() -> Vec<Record> {
    vec![
        record! { "id" => 1, "title" => "Loved it", "status" => "approved", "rating" => 5 },
        record! { "id" => 2, "title" => "Spam link", "status" => "flagged", "rating" => 1 },
        record! { "id" => 3, "title" => "Meh, fine", "status" => "pending", "rating" => 3 },
        record! { "id" => 4, "title" => "Too long", "status" => "flagged", "rating" => 2 },
        record! { "id" => 5, "title" => "Great pacing", "status" => "approved", "rating" => 4 },
    ]
}

/// Source whose every call fails, to exercise error mapping
struct BrokenSource;

#[async_trait]
impl RecordSource for BrokenSource {
    async fn fetch(&self, _request: &ListRequest) -> Result<PaginatedResponse<Record>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn fetch_all(&self, _request: &ListRequest) -> Result<Vec<Record>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

fn setup_test_server() -> TestServer {
    let app = ListServerBuilder::new()
        .register_source(
            "reviews",
            InMemoryRecordSource::with_records(reviews()).with_search_fields(["title"]),
        )
        .register_source("broken", BrokenSource)
        .build()
        .expect("Failed to build app");

    TestServer::new(app).expect("Failed to create test server")
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = setup_test_server();
        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
        }
    }
}

// =============================================================================
// Listing Tests
// =============================================================================

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_listing() {
        let server = setup_test_server();
        let response = server.get("/reviews").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(ids(&body), vec![1, 2, 3, 4, 5]);
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_filter_sort_and_paginate() {
        let server = setup_test_server();
        let response = server
            .get("/reviews")
            .add_query_param("filter", r#"{"rating":{"min":2}}"#)
            .add_query_param("sort", "rating:desc")
            .add_query_param("limit", 2)
            .add_query_param("page", 2)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(ids(&body), vec![3, 4]);
        assert_eq!(body["pagination"]["total"], 4);
        assert_eq!(body["pagination"]["total_pages"], 2);
        assert_eq!(body["pagination"]["has_prev"], true);
    }

    #[tokio::test]
    async fn test_membership_filter_and_search() {
        let server = setup_test_server();
        let response = server
            .get("/reviews")
            .add_query_param("filter", r#"{"status":["approved","pending"]}"#)
            .add_query_param("search", "g")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(ids(&body), vec![5]);
    }

    #[tokio::test]
    async fn test_huge_page_is_empty_not_an_error() {
        let server = setup_test_server();
        let response = server
            .get("/reviews")
            .add_query_param("page", "18446744073709551615")
            .add_query_param("limit", 100)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_invalid_filter_json_is_400() {
        let server = setup_test_server();
        let response = server
            .get("/reviews")
            .add_query_param("filter", "{oops")
            .await;
        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_sort_is_400() {
        let server = setup_test_server();
        let response = server
            .get("/reviews")
            .add_query_param("sort", "rating:sideways")
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_404() {
        let server = setup_test_server();
        let response = server.get("/novels").await;
        assert_eq!(response.status_code(), 404);
        let body: Value = response.json();
        assert_eq!(body["code"], "UNKNOWN_RESOURCE");
        assert_eq!(body["details"], json!({ "resource": "novels" }));
    }

    #[tokio::test]
    async fn test_source_failure_is_502() {
        let server = setup_test_server();
        let response = server.get("/broken").await;
        assert_eq!(response.status_code(), 502);
        let body: Value = response.json();
        assert_eq!(body["code"], "SOURCE_FAILED");
    }
}

// =============================================================================
// Export Tests
// =============================================================================

mod export_tests {
    use super::*;

    #[tokio::test]
    async fn test_csv_export() {
        let server = setup_test_server();
        let response = server
            .get("/reviews/export")
            .add_query_param("filter", r#"{"status":"flagged"}"#)
            .add_query_param("filename", "flagged")
            .await;
        response.assert_status_ok();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv;charset=utf-8;");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"flagged.csv\""
        );
        assert_eq!(
            response.text(),
            "id,title,status,rating\n2,Spam link,flagged,1\n4,Too long,flagged,2"
        );
    }

    #[tokio::test]
    async fn test_csv_export_quotes_commas() {
        let server = setup_test_server();
        let response = server
            .get("/reviews/export")
            .add_query_param("search", "meh")
            .add_query_param("fields", "id,title")
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "id,title\n3,\"Meh, fine\"");
    }

    #[tokio::test]
    async fn test_json_export() {
        let server = setup_test_server();
        let response = server
            .get("/reviews/export")
            .add_query_param("format", "json")
            .add_query_param("sort", "rating")
            .await;
        response.assert_status_ok();

        let body: Value = serde_json::from_str(&response.text()).unwrap();
        let ratings: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["rating"].as_i64().unwrap())
            .collect();
        assert_eq!(ratings, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_excel_export_uses_xlsx_name() {
        let server = setup_test_server();
        let response = server
            .get("/reviews/export")
            .add_query_param("format", "excel")
            .await;
        response.assert_status_ok();
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.ends_with(".xlsx\""));
    }

    #[tokio::test]
    async fn test_unsupported_format_is_400() {
        let server = setup_test_server();
        let response = server
            .get("/reviews/export")
            .add_query_param("format", "pdf")
            .await;
        assert_eq!(response.status_code(), 400);

        let body: Value = response.json();
        assert_eq!(body["code"], "UNSUPPORTED_EXPORT_FORMAT");
        assert_eq!(body["message"], "Unsupported export format: pdf");
    }
}
