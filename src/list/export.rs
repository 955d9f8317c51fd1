//! Export formatter
//!
//! Renders records as CSV, JSON or a simplified "Excel" payload (CSV content
//! with the xlsx MIME type) and hands the result to a [`DownloadSink`].

use crate::config::ExportConfig;
use crate::core::error::ExportError;
use crate::core::flag::InFlight;
use crate::core::record::{FieldValue, Record};
use crate::core::service::DownloadSink;
use crate::list::filter::{FilterSet, apply_filters};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const EXCEL_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Raised when a format name is not one of csv, json or excel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported export format: {0}")]
pub struct UnsupportedFormat(pub String);

impl From<UnsupportedFormat> for ExportError {
    fn from(err: UnsupportedFormat) -> Self {
        ExportError::UnsupportedFormat { format: err.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME_TYPE,
            ExportFormat::Json => JSON_MIME_TYPE,
            ExportFormat::Excel => EXCEL_MIME_TYPE,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "excel" => Ok(ExportFormat::Excel),
            _ => Err(UnsupportedFormat(s.to_string())),
        }
    }
}

/// Derives an output value from a field value and its record
pub type FieldTransform = Arc<dyn Fn(&FieldValue, &Record) -> FieldValue + Send + Sync>;

/// Progress callback, called with 33, 66 and 100
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// One output column
#[derive(Clone)]
pub enum CustomField {
    /// Pass the field through under its own name
    Key(String),
    /// Rename and/or derive the column
    Mapped {
        key: String,
        label: Option<String>,
        transform: Option<FieldTransform>,
    },
}

impl CustomField {
    pub fn key(key: impl Into<String>) -> Self {
        CustomField::Key(key.into())
    }

    pub fn label(self, label: impl Into<String>) -> Self {
        let (key, transform) = self.into_parts();
        CustomField::Mapped {
            key,
            label: Some(label.into()),
            transform,
        }
    }

    pub fn transform<F>(self, transform: F) -> Self
    where
        F: Fn(&FieldValue, &Record) -> FieldValue + Send + Sync + 'static,
    {
        let label = match &self {
            CustomField::Mapped { label, .. } => label.clone(),
            CustomField::Key(_) => None,
        };
        let (key, _) = self.into_parts();
        CustomField::Mapped {
            key,
            label,
            transform: Some(Arc::new(transform)),
        }
    }

    pub fn source_key(&self) -> &str {
        match self {
            CustomField::Key(key) | CustomField::Mapped { key, .. } => key,
        }
    }

    /// Column name in the output
    pub fn header(&self) -> &str {
        match self {
            CustomField::Key(key) => key,
            CustomField::Mapped { key, label, .. } => label.as_deref().unwrap_or(key),
        }
    }

    pub fn value(&self, record: &Record) -> FieldValue {
        let raw = record.value(self.source_key());
        match self {
            CustomField::Mapped {
                transform: Some(transform),
                ..
            } => transform(raw, record),
            _ => raw.clone(),
        }
    }

    fn into_parts(self) -> (String, Option<FieldTransform>) {
        match self {
            CustomField::Key(key) => (key, None),
            CustomField::Mapped { key, transform, .. } => (key, transform),
        }
    }
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomField::Key(key) => f.debug_tuple("Key").field(key).finish(),
            CustomField::Mapped {
                key,
                label,
                transform,
            } => f
                .debug_struct("Mapped")
                .field("key", key)
                .field("label", label)
                .field("transform", &transform.is_some())
                .finish(),
        }
    }
}

impl From<&str> for CustomField {
    fn from(key: &str) -> Self {
        CustomField::key(key)
    }
}

impl From<String> for CustomField {
    fn from(key: String) -> Self {
        CustomField::Key(key)
    }
}

// =============================================================================
// Converters
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions<'a> {
    pub delimiter: char,
    pub include_headers: bool,
    pub custom_fields: Option<&'a [CustomField]>,
}

impl Default for CsvOptions<'_> {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_headers: true,
            custom_fields: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JsonOptions<'a> {
    pub pretty: bool,
    pub custom_fields: Option<&'a [CustomField]>,
}

impl Default for JsonOptions<'_> {
    fn default() -> Self {
        Self {
            pretty: true,
            custom_fields: None,
        }
    }
}

/// Simplified spreadsheet export: CSV content tagged with the xlsx MIME type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcelPayload {
    pub sheet_name: String,
    pub data: String,
    pub mime_type: &'static str,
}

fn columns(data: &[Record], custom_fields: Option<&[CustomField]>) -> Vec<CustomField> {
    match custom_fields {
        Some(fields) if !fields.is_empty() => fields.to_vec(),
        _ => data
            .first()
            .map(|first| first.keys().map(|k| CustomField::key(k.as_str())).collect())
            .unwrap_or_default(),
    }
}

fn escape_csv(value: &FieldValue, delimiter: char) -> String {
    let text = value.to_text();
    if text.contains(delimiter) || text.contains(['"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Render records as CSV
///
/// Columns come from `custom_fields` or the first record's keys. Rows are
/// joined with `\n`; null and absent values are empty cells.
pub fn convert_to_csv(data: &[Record], options: &CsvOptions<'_>) -> String {
    if data.is_empty() {
        return String::new();
    }
    let columns = columns(data, options.custom_fields);
    let separator = options.delimiter.to_string();
    let mut lines = Vec::with_capacity(data.len() + 1);

    if options.include_headers {
        let header = columns
            .iter()
            .map(|c| escape_csv(&FieldValue::from(c.header()), options.delimiter))
            .collect::<Vec<_>>();
        lines.push(header.join(&separator));
    }
    for record in data {
        let row = columns
            .iter()
            .map(|c| escape_csv(&c.value(record), options.delimiter))
            .collect::<Vec<_>>();
        lines.push(row.join(&separator));
    }
    lines.join("\n")
}

/// Render records as a JSON array
pub fn convert_to_json(data: &[Record], options: &JsonOptions<'_>) -> Result<String, ExportError> {
    let rows: Vec<Record> = match options.custom_fields {
        Some(fields) if !fields.is_empty() => data
            .iter()
            .map(|record| {
                fields
                    .iter()
                    .map(|f| (f.header().to_string(), f.value(record)))
                    .collect()
            })
            .collect(),
        _ => data.to_vec(),
    };
    let rendered = if options.pretty {
        serde_json::to_string_pretty(&rows)
    } else {
        serde_json::to_string(&rows)
    };
    rendered.map_err(|e| ExportError::Serialization {
        message: e.to_string(),
    })
}

pub fn convert_to_excel(data: &[Record], sheet_name: &str, csv: &CsvOptions<'_>) -> ExcelPayload {
    ExcelPayload {
        sheet_name: sheet_name.to_string(),
        data: convert_to_csv(data, csv),
        mime_type: EXCEL_MIME_TYPE,
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// Per-call overrides; unset values fall back to [`ExportConfig`]
#[derive(Clone, Default)]
pub struct ExportOptions {
    /// File name without extension
    pub filename: Option<String>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub include_headers: Option<bool>,
    pub delimiter: Option<char>,
    pub pretty: Option<bool>,
    pub sheet_name: Option<String>,
    pub on_progress: Option<ProgressCallback>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(mut self, basename: impl Into<String>) -> Self {
        self.filename = Some(basename.into());
        self
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<CustomField>,
    {
        self.custom_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// `{basename}.{extension}`, defaulting to `export_{YYYY-MM-DD}`
    pub fn resolve_filename(&self, format: ExportFormat) -> String {
        let basename = self
            .filename
            .clone()
            .unwrap_or_else(|| format!("export_{}", Utc::now().format("%Y-%m-%d")));
        format!("{}.{}", basename, format.extension())
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("filename", &self.filename)
            .field("custom_fields", &self.custom_fields)
            .field("include_headers", &self.include_headers)
            .field("delimiter", &self.delimiter)
            .field("pretty", &self.pretty)
            .field("sheet_name", &self.sheet_name)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Generated file content, ready for a sink or an HTTP body
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExport {
    pub content: String,
    pub mime_type: &'static str,
}

/// Render `data` in `format`, resolving options against `config`
pub fn render(
    data: &[Record],
    format: ExportFormat,
    options: &ExportOptions,
    config: &ExportConfig,
) -> Result<RenderedExport, ExportError> {
    let custom_fields = options.custom_fields.as_deref();
    let csv = CsvOptions {
        delimiter: options.delimiter.unwrap_or_else(|| config.delimiter_char()),
        include_headers: options.include_headers.unwrap_or(config.include_headers),
        custom_fields,
    };
    let rendered = match format {
        ExportFormat::Csv => RenderedExport {
            content: convert_to_csv(data, &csv),
            mime_type: CSV_MIME_TYPE,
        },
        ExportFormat::Json => RenderedExport {
            content: convert_to_json(
                data,
                &JsonOptions {
                    pretty: options.pretty.unwrap_or(config.pretty_json),
                    custom_fields,
                },
            )?,
            mime_type: JSON_MIME_TYPE,
        },
        ExportFormat::Excel => {
            let sheet_name = options.sheet_name.as_deref().unwrap_or(&config.sheet_name);
            let payload = convert_to_excel(data, sheet_name, &csv);
            RenderedExport {
                content: payload.data,
                mime_type: payload.mime_type,
            }
        }
    };
    Ok(rendered)
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    fn ok(filename: String, format: ExportFormat, record_count: usize) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            format: Some(format),
            record_count: Some(record_count),
            error: None,
        }
    }

    fn failed(error: &ExportError) -> Self {
        Self {
            success: false,
            filename: None,
            format: None,
            record_count: None,
            error: Some(error.to_string()),
        }
    }
}

/// Export state owned by one list session
pub struct Exporter {
    config: ExportConfig,
    sink: Arc<dyn DownloadSink>,
    exporting: InFlight,
    progress: u8,
    error: Option<String>,
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .field("exporting", &self.exporting)
            .field("progress", &self.progress)
            .field("error", &self.error)
            .finish()
    }
}

impl Exporter {
    pub fn new(sink: Arc<dyn DownloadSink>) -> Self {
        Self::with_config(ExportConfig::default(), sink)
    }

    pub fn with_config(config: ExportConfig, sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            config,
            sink,
            exporting: InFlight::new(),
            progress: 0,
            error: None,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render without saving
    pub fn render(
        &self,
        data: &[Record],
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<RenderedExport, ExportError> {
        render(data, format, options, &self.config)
    }

    /// Render `data` and hand it to the download sink
    ///
    /// Failures (including an unknown `format`) are reported in the result
    /// and kept in [`Exporter::error`]; nothing is downloaded in that case.
    pub async fn export_data(
        &mut self,
        data: &[Record],
        format: &str,
        options: ExportOptions,
    ) -> ExportResult {
        self.error = None;
        self.progress = 0;
        match self.run(data, format, &options).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(format = %format, error = %err, "Export failed");
                self.error = Some(err.to_string());
                ExportResult::failed(&err)
            }
        }
    }

    /// Export a selection; an empty one fails without generating a file
    pub async fn export_selected(
        &mut self,
        selection: &[Record],
        format: &str,
        options: ExportOptions,
    ) -> ExportResult {
        if selection.is_empty() {
            let err = ExportError::NoDataSelected;
            self.error = Some(err.to_string());
            return ExportResult::failed(&err);
        }
        self.export_data(selection, format, options).await
    }

    /// Filter `all` with the usual filter semantics, then export the rest
    pub async fn export_filtered(
        &mut self,
        all: &[Record],
        filters: &FilterSet,
        format: &str,
        options: ExportOptions,
    ) -> ExportResult {
        let filtered = apply_filters(all, filters, None);
        self.export_data(&filtered, format, options).await
    }

    async fn run(
        &mut self,
        data: &[Record],
        format: &str,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        let format: ExportFormat = format.parse()?;
        let _busy = self.exporting.begin();

        self.report(options, 33);
        let rendered = self.render(data, format, options)?;
        self.report(options, 66);

        let filename = options.resolve_filename(format);
        self.sink
            .download_file(&rendered.content, &filename, rendered.mime_type)
            .await
            .map_err(|e| ExportError::DownloadFailed {
                filename: filename.clone(),
                message: e.to_string(),
            })?;
        self.report(options, 100);

        tracing::debug!(
            filename = %filename,
            format = %format,
            records = data.len(),
            "Export completed"
        );
        Ok(ExportResult::ok(filename, format, data.len()))
    }

    fn report(&mut self, options: &ExportOptions, percent: u8) {
        self.progress = percent;
        if let Some(callback) = &options.on_progress {
            callback(percent);
        }
    }

    /// Last reported progress percentage
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.get()
    }

    pub fn exporting_flag(&self) -> InFlight {
        self.exporting.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
