//! Sort engine
//!
//! Type-aware ordering with nulls always last, whatever the direction.

use crate::core::error::ValidationError;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ValidationError::InvalidSort {
                value: s.to_string(),
            }),
        }
    }
}

/// Which field to sort by, and how
///
/// `field: None` means "keep collection order".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `field`, `field:asc` or `field:desc`; an empty string means no sort
    pub fn parse(expr: &str) -> Result<Self, ValidationError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Ok(Self::none());
        }
        let (field, direction) = match expr.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.trim().parse()?),
            None => (expr, SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(ValidationError::InvalidSort {
                value: expr.to_string(),
            });
        }
        Ok(Self {
            field: Some(field.to_string()),
            direction,
        })
    }
}

/// Compare two records on `field`
///
/// Null and absent values sort after every defined value in both directions.
/// Defined values of different kinds do not compare as equal: they are ordered
/// by kind (booleans, numbers, dates, strings, then nested JSON) so the order
/// stays total, and the direction flips that order like any other.
pub fn compare_records(a: &Record, b: &Record, field: &str, direction: SortDirection) -> Ordering {
    let (left, right) = (a.value(field), b.value(field));
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = left.compare(right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// Sort a collection into a new vector
///
/// The sort is stable. With no field the collection order is kept.
pub fn apply_sorting(data: &[Record], field: Option<&str>, direction: SortDirection) -> Vec<Record> {
    let mut sorted = data.to_vec();
    if let Some(field) = field {
        sorted.sort_by(|a, b| compare_records(a, b, field, direction));
    }
    sorted
}

/// Sort state owned by one list session
#[derive(Debug, Clone, Default)]
pub struct Sort {
    spec: SortSpec,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(spec: SortSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    pub fn field(&self) -> Option<&str> {
        self.spec.field.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.spec.direction
    }

    /// Column-header click: toggle on the same field, else sort ascending
    pub fn sort_by_column(&mut self, field: &str) {
        if self.field() == Some(field) {
            self.spec.direction = self.spec.direction.toggled();
        } else {
            self.spec = SortSpec::asc(field);
        }
        tracing::debug!(field = %field, direction = %self.spec.direction, "Sort changed");
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.spec = spec;
    }

    pub fn clear_sort(&mut self) {
        self.spec = SortSpec::none();
    }

    pub fn apply(&self, data: &[Record]) -> Vec<Record> {
        apply_sorting(data, self.field(), self.direction())
    }
}
