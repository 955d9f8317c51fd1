//! Configuration loading and management

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Search engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum query length (in characters) for a query to be active
    pub min_length: usize,

    /// Match case exactly instead of case-insensitively
    pub case_sensitive: bool,

    /// Record successful queries in the search history
    pub enable_history: bool,

    /// Maximum number of history entries kept
    pub max_history: usize,

    /// Debounce window for keystroke-driven search, in milliseconds
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            case_sensitive: false,
            enable_history: true,
            max_history: 10,
            debounce_ms: 300,
        }
    }
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Initial (and reset) page size
    pub page_size: usize,

    /// Page buttons shown by `get_page_numbers` before ellipses kick in
    pub max_visible_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_visible_pages: 5,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV field delimiter, a single character
    pub delimiter: String,

    /// Emit a header row in CSV output
    pub include_headers: bool,

    /// Indent JSON output
    pub pretty_json: bool,

    /// Sheet name of the simplified Excel payload
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            include_headers: true,
            pretty_json: true,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl ExportConfig {
    /// The delimiter as a char (falls back to a comma)
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(',')
    }
}

/// Markers wrapped around search hits by `highlight_search_term`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    pub open: String,
    pub close: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

/// Complete configuration of a list engine instance
///
/// # Example
///
/// ```yaml
/// id_field: id
/// search:
///   min_length: 2
///   case_sensitive: false
/// pagination:
///   page_size: 25
/// export:
///   delimiter: ";"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Field holding each record's unique identifier
    pub id_field: String,

    pub search: SearchConfig,

    pub pagination: PaginationConfig,

    pub export: ExportConfig,

    pub highlight: HighlightConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            search: SearchConfig::default(),
            pagination: PaginationConfig::default(),
            export: ExportConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the engines cannot work with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.id_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "id_field".to_string(),
                value: self.id_field.clone(),
                message: "must not be empty".to_string(),
            });
        }
        if self.pagination.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.pagination.max_visible_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_visible_pages".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.export.delimiter.chars().count() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "export.delimiter".to_string(),
                value: self.export.delimiter.clone(),
                message: "must be a single character".to_string(),
            });
        }
        Ok(())
    }
}
