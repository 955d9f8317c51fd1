//! Tests for loading engine configuration from YAML files

use std::io::Write;
use tempfile::NamedTempFile;
use this_list::prelude::*;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
id_field: review_id
search:
  min_length: 2
  case_sensitive: true
  max_history: 3
pagination:
  page_size: 25
  max_visible_pages: 7
export:
  delimiter: ";"
  include_headers: false
  pretty_json: false
  sheet_name: Reviews
highlight:
  open: "<b>"
  close: "</b>"
"#,
    );

    let config = EngineConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.id_field, "review_id");
    assert_eq!(config.search.min_length, 2);
    assert!(config.search.case_sensitive);
    assert!(config.search.enable_history);
    assert_eq!(config.pagination.page_size, 25);
    assert_eq!(config.export.delimiter_char(), ';');
    assert_eq!(config.highlight.open, "<b>");
}

#[test]
fn test_missing_file_is_reported() {
    let err = EngineConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_malformed_file_names_the_file() {
    let file = write_config("pagination: [unclosed");
    let path = file.path().to_str().unwrap().to_string();
    let err = EngineConfig::from_yaml_file(&path).unwrap_err();
    assert!(err.to_string().contains(&path));
}

#[test]
fn test_config_drives_engines() {
    let config = EngineConfig::from_yaml_str(
        r#"
id_field: review_id
pagination:
  page_size: 2
  max_visible_pages: 3
search:
  min_length: 3
highlight:
  open: "["
  close: "]"
"#,
    )
    .unwrap();

    let data: Vec<Record> = (1..=19)
        .map(|i| record! { "review_id" => i, "title" => format!("Review {}", i) })
        .collect();
    let mut table = DataTable::new(config).with_data(data);

    table.go_to_page(5);
    assert_eq!(
        serde_json::to_value(table.page_numbers()).unwrap(),
        json!([1, "...", 4, 5, 6, "...", 10])
    );

    table.selection_mut().select_item(4);
    assert_eq!(table.selection().selected_data().len(), 1);

    // Too short to search, so the data stays as is
    table.set_search_query("Re");
    assert_eq!(table.working_set().len(), 19);

    assert_eq!(
        table.search().highlight_search_term("Review 4", "view"),
        "Re[view] 4"
    );
}
