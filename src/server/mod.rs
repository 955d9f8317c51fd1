//! Server module for exposing record sources over HTTP
//!
//! This module provides a `ListServerBuilder` that registers, for every named
//! record source:
//! - A paginated listing route with filter, sort and search parameters
//! - An export route producing CSV, JSON or Excel downloads

pub mod builder;
pub mod rest;

pub use builder::ListServerBuilder;
pub use rest::{ExportQuery, ListState, RestExposure};
