//! Filter value validation
//!
//! Validation failures are data, not errors: [`validate_filter`] returns a
//! [`ValidationResult`] and never fails.

pub mod validators;

use crate::core::error::ValidationError;
use crate::core::record::FieldValue;
use serde::{Deserialize, Serialize};

/// Rules a filter value must satisfy
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
}

/// Outcome of a validation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// Turn a failed validation into an error for `field`
    pub fn into_result(self, field: &str) -> Result<(), ValidationError> {
        if self.is_valid {
            return Ok(());
        }
        Err(ValidationError::FieldError {
            field: field.to_string(),
            message: self.error.unwrap_or_else(|| "is invalid".to_string()),
        })
    }
}

/// Validate a filter value against a set of rules
///
/// Rules are checked in the order required → length → range → pattern and the
/// first failure is reported. A blank value that is not required is valid.
pub fn validate_filter(key: &str, value: &FieldValue, rules: &FilterRules) -> ValidationResult {
    if rules.required {
        if let Err(message) = validators::required()(key, value) {
            return ValidationResult::invalid(message);
        }
    } else if value.is_blank() {
        return ValidationResult::valid();
    }

    let checks: [Box<dyn Fn(&str, &FieldValue) -> Result<(), String>>; 2] = [
        Box::new(validators::string_length(rules.min_length, rules.max_length)),
        Box::new(validators::number_range(rules.min, rules.max)),
    ];
    for check in &checks {
        if let Err(message) = check(key, value) {
            return ValidationResult::invalid(message);
        }
    }

    if let Some(pattern) = &rules.pattern
        && let Err(message) = validators::pattern(pattern)(key, value)
    {
        return ValidationResult::invalid(message);
    }

    ValidationResult::valid()
}
