//! Reusable filter value validators
//!
//! Each validator checks one rule and returns the user-facing message of the
//! first violation. Values of a type the rule does not apply to pass.

use crate::core::record::FieldValue;
use regex::Regex;

/// Validator: value is present (not null, not an empty string)
pub fn required() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| {
        if value.is_blank() {
            Err(format!("{} is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: string length (in characters) within optional bounds
pub fn string_length(
    min: Option<usize>,
    max: Option<usize>,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if let Some(min) = min.filter(|min| len < *min) {
            return Err(format!("{} must be at least {} characters", field, min));
        }
        if let Some(max) = max.filter(|max| len > *max) {
            return Err(format!("{} must be at most {} characters", field, max));
        }
        Ok(())
    }
}

/// Validator: number within optional bounds (inclusive)
pub fn number_range(
    min: Option<f64>,
    max: Option<f64>,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let Some(num) = value.as_f64() else {
            return Ok(());
        };
        if let Some(min) = min.filter(|min| num < *min) {
            return Err(format!("{} must be at least {}", field, min));
        }
        if let Some(max) = max.filter(|max| num > *max) {
            return Err(format!("{} must be at most {}", field, max));
        }
        Ok(())
    }
}

/// Validator: string matches a regular expression
///
/// An invalid pattern is reported as a validation failure rather than a panic.
pub fn pattern(
    pattern: &str,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    let compiled = Regex::new(pattern).map_err(|e| e.to_string());
    move |field: &str, value: &FieldValue| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        match &compiled {
            Ok(re) if re.is_match(s) => Ok(()),
            Ok(_) => Err(format!("{} has an invalid format", field)),
            Err(e) => Err(format!("{} has an invalid pattern rule: {}", field, e)),
        }
    }
}
