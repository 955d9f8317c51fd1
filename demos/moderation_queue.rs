//! Review moderation queue
//!
//! This example demonstrates:
//! - Loading engine settings from YAML
//! - Filtering, searching, sorting and paginating a review table
//! - A bulk action over the selection
//! - Exporting the working set as CSV
//! - Serving the same reviews over REST (pass `--serve`)

use std::sync::Arc;
use this_list::prelude::*;
use tracing_subscriber::EnvFilter;

fn reviews() -> Vec<Record> {
    vec![
        record! { "id" => 101, "novel" => "Ashen Crown", "author" => "mira", "rating" => 5, "status" => "approved", "body" => "Loved the pacing" },
        record! { "id" => 102, "novel" => "Ashen Crown", "author" => "k_vo", "rating" => 1, "status" => "flagged", "body" => "Free coins at spam.example" },
        record! { "id" => 103, "novel" => "Tidebound", "author" => "ravi", "rating" => 3, "status" => "pending", "body" => "Slow start, great ending" },
        record! { "id" => 104, "novel" => "Tidebound", "author" => "anon", "rating" => FieldValue::Null, "status" => "flagged", "body" => "SPOILER: the captain dies" },
        record! { "id" => 105, "novel" => "Glass Orchard", "author" => "lee", "rating" => 4, "status" => "approved", "body" => "Great worldbuilding" },
        record! { "id" => 106, "novel" => "Glass Orchard", "author" => "bot_77", "rating" => 1, "status" => "flagged", "body" => "Visit spam.example now" },
        record! { "id" => 107, "novel" => "Ashen Crown", "author" => "june", "rating" => 2, "status" => "pending", "body" => "Not for me" },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("📋 This-List Moderation Queue Example");
    println!("=====================================\n");

    let config = EngineConfig::from_yaml_str(include_str!("moderation.yaml"))?;
    println!("✅ Loaded configuration (page size {})\n", config.pagination.page_size);

    if std::env::args().any(|arg| arg == "--serve") {
        let addr = "127.0.0.1:3000";
        println!("🌐 Serving reviews on http://{}", addr);
        println!("   GET /reviews?filter={{\"status\":\"flagged\"}}&sort=rating:desc");
        println!("   GET /reviews/export?format=json\n");

        return ListServerBuilder::new()
            .with_config(config.clone())
            .register_source(
                "reviews",
                InMemoryRecordSource::with_records(reviews())
                    .with_search_fields(["novel", "author", "body"])
                    .with_search_config(config.search),
            )
            .with_permissive_cors()
            .serve(addr)
            .await;
    }

    let mut table = DataTable::new(config.clone())
        .with_search_fields(["novel", "author", "body"])
        .with_data(reviews());

    // Filter + sort
    table.set_filter("status", FilterValue::any_of(["flagged", "pending"]));
    table.sort_by_column("rating");
    println!("🔎 Flagged or pending, lowest rating first:");
    print_page(&table);

    table.go_to_next_page();
    println!("➡️  Next page:");
    print_page(&table);

    // Search
    table.set_search_query("spam");
    println!("🔎 Searching for \"spam\":");
    print_page(&table);
    for record in table.working_set() {
        let body = record.value("body").to_text();
        println!("   {}", table.search().highlight_search_term(&body, "spam"));
    }
    println!();

    // Bulk action
    table.selection_mut().select_all();
    let summary = table.selection().get_selection_summary();
    println!(
        "☑️  Selected {}/{} ({}%)",
        summary.selected, summary.total, summary.percentage
    );

    let result = table
        .selection_mut()
        .execute_bulk_action(
            |records, args| async move {
                let ids: Vec<String> = records.iter().map(|r| r.value("id").to_text()).collect();
                tracing::info!(ids = ?ids, reason = %args["reason"], "Rejecting reviews");
                Ok(json!({ "rejected": ids }))
            },
            json!({ "reason": "spam" }),
        )
        .await;
    println!("🧹 Bulk reject: {:?}\n", result.result);

    let remaining: Vec<Record> = table
        .data()
        .iter()
        .filter(|r| !table.selection().is_selected(r.value("id").to_text()))
        .cloned()
        .collect();
    table.selection_mut().clear_selection();
    table.clear_search();
    table.clear_all_filters();
    table.set_data(remaining);

    // Export
    let dir = std::env::temp_dir().join("this-list-demo");
    let mut exporter = Exporter::with_config(
        config.export.clone(),
        Arc::new(FileSystemSink::new(&dir)),
    );
    let result = table
        .export_working_set(
            &mut exporter,
            "csv",
            ExportOptions::new()
                .filename("remaining_reviews")
                .fields(["id", "novel", "rating", "status"])
                .on_progress(|percent| tracing::debug!(percent, "Export progress")),
        )
        .await;

    match (result.success, result.filename) {
        (true, Some(filename)) => println!(
            "💾 Exported {} reviews to {}",
            result.record_count.unwrap_or(0),
            dir.join(filename).display()
        ),
        _ => println!("❌ Export failed: {}", result.error.unwrap_or_default()),
    }

    Ok(())
}

fn print_page(table: &DataTable) {
    let info = table.pagination_info();
    for record in table.page_data() {
        println!(
            "   #{} {:<14} {:>4} {:<9} {}",
            record.value("id"),
            record.value("novel").to_text(),
            record.value("rating").to_text(),
            record.value("status").to_text(),
            record.value("author"),
        );
    }
    println!(
        "   showing {}-{} of {} (page {}/{})\n",
        info.start_index, info.end_index, info.total_items, info.current_page, info.total_pages
    );
}
