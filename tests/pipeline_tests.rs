//! End-to-end tests of the list pipeline
//!
//! These tests drive the engines the way a dashboard does: records flow
//! Filter → Search → Sort → Pagination, and selection and export work over
//! the result.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use this_list::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn people() -> Vec<Record> {
    vec![
        record! { "id" => 1, "name" => "Bob", "age" => 30 },
        record! { "id" => 2, "name" => "Al", "age" => 25 },
        record! { "id" => 3, "name" => "Cy", "age" => 35 },
        record! { "id" => 4, "name" => "Dee", "age" => 28 },
    ]
}

fn reviews() -> Vec<Record> {
    vec![
        record! { "id" => 10, "title" => "Loved it", "status" => "approved", "rating" => 5, "score" => 0.9 },
        record! { "id" => 11, "title" => "Spam link", "status" => "flagged", "rating" => 1, "score" => FieldValue::Null },
        record! { "id" => 12, "title" => "Meh", "status" => "pending", "rating" => 3, "score" => 0.4 },
        record! { "id" => 13, "title" => "Too long", "status" => "flagged", "rating" => 2 },
        record! { "id" => 14, "title" => "Great pacing", "status" => "approved", "rating" => 4, "score" => 0.7 },
    ]
}

fn names(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.value("name").to_text()).collect()
}

fn ids(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.value("id").to_text()).collect()
}

// =============================================================================
// Filter Properties
// =============================================================================

mod filter_tests {
    use super::*;

    #[test]
    fn test_filtering_is_idempotent() {
        let filters = FilterSet::new()
            .with("status", FilterValue::any_of(["flagged", "pending"]))
            .with("rating", FilterValue::at_most(3));
        let once = apply_filters(&reviews(), &filters, None);
        let twice = apply_filters(&once, &filters, None);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["11", "12", "13"]);
    }

    #[test]
    fn test_inactive_filters_are_identity() {
        let data = reviews();
        assert_eq!(apply_filters(&data, &FilterSet::new(), None), data);
        assert_eq!(
            apply_filters(&data, &FilterSet::new().with("status", ""), None),
            data
        );
    }

    #[test]
    fn test_filter_set_from_query_json() {
        let filters: FilterSet =
            serde_json::from_str(r#"{"status":"flag","rating":{"min":2},"title":null}"#).unwrap();
        assert_eq!(filters.active_count(), 2);
        let result = apply_filters(&reviews(), &filters, None);
        assert_eq!(ids(&result), vec!["13"]);
    }

    #[test]
    fn test_custom_filter_replaces_default_logic() {
        let custom: this_list::list::filter::CustomFilter =
            Arc::new(|data: &[Record], _filters: &FilterSet| -> Vec<Record> {
                data.iter()
                    .filter(|r| r.value("rating").as_f64().is_some_and(|n| n >= 4.0))
                    .cloned()
                    .collect()
            });
        let filters = Filters::new().with_custom(custom);
        assert_eq!(ids(&filters.apply(&reviews())), vec!["10", "14"]);
    }
}

// =============================================================================
// Sort Properties
// =============================================================================

mod sort_tests {
    use super::*;

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let asc = apply_sorting(&reviews(), Some("score"), SortDirection::Asc);
        assert_eq!(ids(&asc), vec!["12", "14", "10", "11", "13"]);

        let desc = apply_sorting(&reviews(), Some("score"), SortDirection::Desc);
        assert_eq!(ids(&desc), vec!["10", "14", "12", "11", "13"]);
    }

    #[test]
    fn test_sort_toggle_on_fresh_engine() {
        let mut sort = Sort::new();
        sort.sort_by_column("x");
        let first = sort.direction();
        sort.sort_by_column("x");
        assert_eq!((first, sort.direction()), (SortDirection::Asc, SortDirection::Desc));
    }
}

// =============================================================================
// Pagination Properties
// =============================================================================

mod pagination_tests {
    use super::*;

    fn in_bounds(pagination: &Pagination) -> bool {
        let page = pagination.current_page();
        page >= 1 && page <= pagination.total_pages().max(1)
    }

    #[test]
    fn test_bounds_hold_after_any_navigation() {
        for total in [0usize, 1, 9, 10, 11, 57] {
            for size in [1usize, 3, 10] {
                let mut pagination = Pagination::new(size).with_total(total);
                for page in [-1i64, 0, 1, 2, 5, 100] {
                    pagination.go_to_page(page);
                    assert!(in_bounds(&pagination));
                    pagination.go_to_next_page();
                    assert!(in_bounds(&pagination));
                    pagination.go_to_previous_page();
                    assert!(in_bounds(&pagination));
                    pagination.change_page_size(size * 2);
                    assert!(in_bounds(&pagination));
                    pagination.go_to_last_page();
                    assert!(in_bounds(&pagination));
                    pagination.change_page_size(size);
                    assert!(in_bounds(&pagination));
                }
            }
        }
    }

    #[test]
    fn test_extreme_jumps_are_silent_no_ops() {
        let mut pagination = Pagination::new(10).with_total(100);
        pagination.go_to_page(2);
        assert!(!pagination.jump_to_item(i64::MAX));
        assert!(!pagination.jump_to_item(i64::MIN));
        assert!(!pagination.jump_to_percentage(f64::INFINITY));
        assert!(!pagination.jump_to_percentage(f64::NAN));
        assert_eq!(pagination.current_page(), 2);
    }

    #[test]
    fn test_page_size_resize_reflow() {
        let mut pagination = Pagination::new(10).with_total(25);
        pagination.go_to_page(3);
        pagination.change_page_size(20);
        assert_eq!(pagination.current_page(), 2);
        assert_eq!(pagination.total_pages(), 2);
    }
}

// =============================================================================
// Selection Properties
// =============================================================================

mod selection_tests {
    use super::*;

    #[test]
    fn test_selection_consistency() {
        let mut selection = Selection::default().with_data(people());
        selection.select_all();
        assert!(selection.is_all_selected());
        assert!(!selection.is_indeterminate());

        selection.deselect_item(3);
        assert!(!selection.is_all_selected());
        assert!(selection.is_indeterminate());
    }

    #[test]
    fn test_stale_ids_drop_out_as_working_set_changes() {
        let mut table = DataTable::new(EngineConfig::default()).with_data(reviews());
        table.selection_mut().select_all();
        assert_eq!(table.selection().get_selection_summary().percentage, 100);

        table.set_filter("status", "flagged");
        let summary = table.selection().get_selection_summary();
        assert_eq!((summary.total, summary.selected, summary.unselected), (2, 2, 0));
        assert!(table.selection().is_all_selected());
        assert!(!table.selection().is_indeterminate());

        table.selection_mut().deselect_item(13);
        assert!(table.selection().is_indeterminate());

        // Replacing the data drops ids that no longer exist
        let remaining: Vec<Record> = reviews()
            .into_iter()
            .filter(|r| r.value("id").to_text() != "11")
            .collect();
        table.set_data(remaining);
        let summary = table.selection().get_selection_summary();
        assert_eq!((summary.total, summary.selected, summary.percentage), (1, 0, 0));
        assert!(!table.selection().is_all_selected());
        assert!(!table.selection().is_indeterminate());
    }

    #[tokio::test]
    async fn test_bulk_action_on_empty_selection_never_invokes_action() {
        let mut selection = Selection::default().with_data(people());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = selection
            .execute_bulk_action(
                move |_, _| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({}))
                },
                json!({}),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No items selected"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

// =============================================================================
// Export Properties
// =============================================================================

mod export_tests {
    use super::*;
    use this_list::list::export::{JsonOptions, convert_to_csv, convert_to_json};

    #[test]
    fn test_json_round_trip() {
        let data = people();
        let text = convert_to_json(
            &data,
            &JsonOptions {
                pretty: false,
                custom_fields: None,
            },
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, serde_json::to_value(&data).unwrap());
    }

    #[test]
    fn test_csv_escaping_of_comma_and_quote() {
        let data = vec![record! { "greeting" => "Hello, \"World\"" }];
        let csv = convert_to_csv(&data, &Default::default());
        assert_eq!(csv, "greeting\n\"Hello, \"\"World\"\"\"");
    }

    #[tokio::test]
    async fn test_unsupported_format_triggers_no_download() {
        let sink = Arc::new(MemorySink::new());
        let mut exporter = Exporter::new(sink.clone());
        let result = exporter
            .export_data(&people(), "pdf", ExportOptions::new())
            .await;

        assert!(!result.success);
        assert!(
            result
                .error
                .unwrap()
                .contains("Unsupported export format")
        );
        assert!(sink.downloads().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_to_file_system() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = Exporter::new(Arc::new(FileSystemSink::new(dir.path())));
        let result = exporter
            .export_data(&people(), "excel", ExportOptions::new().filename("people"))
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("people.xlsx")).unwrap();
        assert!(content.starts_with("id,name,age\n1,Bob,30"));
    }
}

// =============================================================================
// Composite Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_filter_sort_paginate_scenario() {
        let mut config = EngineConfig::default();
        config.pagination.page_size = 2;
        let mut table = DataTable::new(config).with_data(people());

        table.set_filter("age", FilterValue::at_least(26));
        assert_eq!(names(table.working_set()).len(), 3);
        assert!(!names(table.working_set()).contains(&"Al".to_string()));

        table.sort_by_column("name");
        assert_eq!(names(table.working_set()), vec!["Bob", "Cy", "Dee"]);
        assert_eq!(names(&table.page_data()), vec!["Bob", "Cy"]);
        assert_eq!(table.pagination().total_pages(), 2);
    }

    #[tokio::test]
    async fn test_moderation_flow() {
        let mut table = DataTable::new(EngineConfig::default())
            .with_search_fields(["title"])
            .with_data(reviews());

        table.set_filter("status", "flagged");
        table.selection_mut().select_all();
        assert_eq!(table.selection().selected_count(), 2);

        let result = table
            .selection_mut()
            .execute_bulk_action(
                |records, args| async move {
                    Ok(json!({
                        "removed": records.iter().map(|r| r.value("id").to_text()).collect::<Vec<_>>(),
                        "reason": args["reason"],
                    }))
                },
                json!({ "reason": "spam" }),
            )
            .await;
        assert!(result.success);
        assert_eq!(
            result.result.unwrap(),
            json!({ "removed": ["11", "13"], "reason": "spam" })
        );

        let remaining: Vec<Record> = table
            .data()
            .iter()
            .filter(|r| r.value("status").as_str() != Some("flagged"))
            .cloned()
            .collect();
        table.set_data(remaining);
        assert!(table.working_set().is_empty());
        assert!(table.selection().selected_data().is_empty());

        table.clear_all_filters();
        table.set_search_query("great");
        assert_eq!(ids(table.working_set()), vec!["14"]);
    }

    #[tokio::test]
    async fn test_search_lookup_records_history() {
        let mut search = Search::default();
        let results = search
            .search("  pacing ", |query| async move {
                let query = query.trim().to_lowercase();
                Ok(reviews()
                    .into_iter()
                    .filter(|r| r.value("title").to_text().to_lowercase().contains(&query))
                    .collect())
            })
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["14"]);
        assert_eq!(search.history(), ["pacing".to_string()]);
        assert!(!search.is_searching());
    }
}
