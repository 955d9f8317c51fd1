//! Core module containing fundamental types and traits for the engine

pub mod error;
pub mod flag;
pub mod query;
pub mod record;
pub mod service;
pub mod validation;

pub use error::{ListError, ListResult};
pub use flag::InFlight;
pub use query::{ListQuery, ListRequest, PaginatedResponse, PaginationMeta};
pub use record::{FieldValue, Record, RecordId};
pub use service::{DownloadSink, RecordSource};
pub use validation::{FilterRules, ValidationResult, validate_filter};
