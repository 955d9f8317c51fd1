//! Filter engine
//!
//! A [`FilterSet`] maps field names to [`FilterValue`]s. Active entries are
//! ANDed together; inactive ones (null, empty string, empty array, bound-less
//! range) never restrict the collection.

use crate::core::record::{FieldValue, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied filtering logic that replaces the default predicates
pub type CustomFilter = Arc<dyn Fn(&[Record], &FilterSet) -> Vec<Record> + Send + Sync>;

/// The value of one filter entry
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    /// Case-insensitive substring match against the field's text
    Text(String),
    /// Exact numeric match
    Number(f64),
    /// Exact boolean match
    Bool(bool),
    /// Field value must be one of these
    AnyOf(Vec<FieldValue>),
    /// Inclusive numeric or date range, either bound optional
    Range {
        min: Option<FieldValue>,
        max: Option<FieldValue>,
    },
    /// Matches everything
    #[default]
    Inactive,
}

impl FilterValue {
    /// Range with both bounds
    pub fn between(min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Self {
        Self::range(Some(min.into()), Some(max.into()))
    }

    /// "Greater than or equal" filter
    pub fn at_least(min: impl Into<FieldValue>) -> Self {
        Self::range(Some(min.into()), None)
    }

    /// "Less than or equal" filter
    pub fn at_most(max: impl Into<FieldValue>) -> Self {
        Self::range(None, Some(max.into()))
    }

    /// Range from optional bounds; blank bounds are dropped
    pub fn range(min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        FilterValue::Range {
            min: min.filter(|v| !v.is_blank()),
            max: max.filter(|v| !v.is_blank()),
        }
    }

    /// Membership filter
    pub fn any_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        FilterValue::AnyOf(values.into_iter().map(Into::into).collect())
    }

    /// Whether this value restricts the collection at all
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => !s.is_empty(),
            FilterValue::Number(_) | FilterValue::Bool(_) => true,
            FilterValue::AnyOf(values) => !values.is_empty(),
            FilterValue::Range { min, max } => min.is_some() || max.is_some(),
            FilterValue::Inactive => false,
        }
    }

    /// Test a single field value against this filter
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            FilterValue::Inactive => true,
            FilterValue::Text(needle) if needle.is_empty() => true,
            FilterValue::Text(needle) => {
                !value.is_null()
                    && value
                        .to_text()
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
            FilterValue::Number(n) => value.as_f64() == Some(*n),
            FilterValue::Bool(b) => value.as_bool() == Some(*b),
            FilterValue::AnyOf(values) => {
                values.is_empty() || values.iter().any(|candidate| candidate.loose_eq(value))
            }
            FilterValue::Range { min, max } => {
                let above_min = min.as_ref().is_none_or(|bound| {
                    compare_to_bound(value, bound).is_some_and(|o| o != Ordering::Less)
                });
                let below_max = max.as_ref().is_none_or(|bound| {
                    compare_to_bound(value, bound).is_some_and(|o| o != Ordering::Greater)
                });
                above_min && below_max
            }
        }
    }
}

/// Compare a record value to a range bound; `None` when they are not comparable
fn compare_to_bound(value: &FieldValue, bound: &FieldValue) -> Option<Ordering> {
    if let (Some(v), Some(b)) = (value.as_f64(), bound.as_f64()) {
        return Some(v.total_cmp(&b));
    }
    match (value.as_datetime(), bound.as_datetime()) {
        (Some(v), Some(b)) => Some(v.cmp(&b)),
        _ => None,
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FilterValue::Inactive,
            Value::Bool(b) => FilterValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(FilterValue::Inactive, FilterValue::Number),
            Value::String(s) if s.is_empty() => FilterValue::Inactive,
            Value::String(s) => FilterValue::Text(s),
            Value::Array(items) if items.is_empty() => FilterValue::Inactive,
            Value::Array(items) => {
                FilterValue::AnyOf(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(mut map) if map.contains_key("min") || map.contains_key("max") => {
                FilterValue::range(
                    map.remove("min").map(FieldValue::from),
                    map.remove("max").map(FieldValue::from),
                )
            }
            Value::Object(_) => FilterValue::Inactive,
        }
    }
}

impl From<&FilterValue> for Value {
    fn from(value: &FilterValue) -> Self {
        let to_json = |v: &FieldValue| serde_json::to_value(v).unwrap_or(Value::Null);
        match value {
            FilterValue::Text(s) => Value::String(s.clone()),
            FilterValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FilterValue::Bool(b) => Value::Bool(*b),
            FilterValue::AnyOf(values) => Value::Array(values.iter().map(to_json).collect()),
            FilterValue::Range { min, max } => {
                let mut map = Map::new();
                if let Some(min) = min {
                    map.insert("min".to_string(), to_json(min));
                }
                if let Some(max) = max {
                    map.insert("max".to_string(), to_json(max));
                }
                Value::Object(map)
            }
            FilterValue::Inactive => Value::Null,
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FilterValue::from)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            FilterValue::Inactive
        } else {
            FilterValue::Text(value.to_string())
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::from(value.as_str())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Inactive, Into::into)
    }
}

/// Named filters, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(IndexMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    /// Remove the entry entirely
    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.shift_remove(key)
    }

    /// Merge another set into this one, overwriting shared keys
    pub fn merge(&mut self, other: FilterSet) {
        self.0.extend(other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Number of entries, active or not
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(FilterValue::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.0.values().filter(|v| v.is_active()).count()
    }

    pub fn has_active(&self) -> bool {
        self.0.values().any(FilterValue::is_active)
    }

    /// Whether a record satisfies every active entry
    pub fn matches(&self, record: &Record) -> bool {
        self.0
            .iter()
            .filter(|(_, filter)| filter.is_active())
            .all(|(field, filter)| filter.matches(record.value(field)))
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Apply a filter set to a collection
///
/// When `custom` is given it fully replaces the default predicates. Neither
/// `data` nor `filters` is modified.
pub fn apply_filters(
    data: &[Record],
    filters: &FilterSet,
    custom: Option<&CustomFilter>,
) -> Vec<Record> {
    if let Some(custom) = custom {
        return custom(data, filters);
    }
    if !filters.has_active() {
        return data.to_vec();
    }
    data.iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect()
}

/// Settings for [`get_filter_options`]
pub struct FilterOptionsConfig<'a> {
    pub unique: bool,
    pub sort: bool,
    pub transform: Option<&'a dyn Fn(&FieldValue) -> FieldValue>,
}

impl Default for FilterOptionsConfig<'_> {
    fn default() -> Self {
        Self {
            unique: true,
            sort: true,
            transform: None,
        }
    }
}

/// Extract candidate filter values for a field across a collection
///
/// Null and empty-string values are skipped (before and after `transform`).
pub fn get_filter_options(
    data: &[Record],
    field: &str,
    config: &FilterOptionsConfig<'_>,
) -> Vec<FieldValue> {
    let mut options: Vec<FieldValue> = Vec::new();
    for record in data {
        let raw = record.value(field);
        if raw.is_blank() {
            continue;
        }
        let value = match config.transform {
            Some(transform) => transform(raw),
            None => raw.clone(),
        };
        if value.is_blank() {
            continue;
        }
        if config.unique && options.iter().any(|existing| existing.loose_eq(&value)) {
            continue;
        }
        options.push(value);
    }
    if config.sort {
        options.sort_by(|a, b| a.compare(b));
    }
    options
}

/// Filter state owned by one list session
///
/// Keeps the initial set so [`Filters::reset_filters`] can restore it.
#[derive(Clone, Default)]
pub struct Filters {
    initial: FilterSet,
    current: FilterSet,
    custom: Option<CustomFilter>,
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filters")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a non-empty filter set, which `reset_filters` restores
    pub fn with_initial(initial: FilterSet) -> Self {
        Self {
            current: initial.clone(),
            initial,
            custom: None,
        }
    }

    /// Replace the default predicates with caller logic
    pub fn with_custom(mut self, custom: CustomFilter) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn filters(&self) -> &FilterSet {
        &self.current
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.current.get(key)
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        tracing::debug!(filter = %key, active = value.is_active(), "Filter updated");
        self.current.set(key, value);
    }

    /// Merge several filters at once
    pub fn set_multiple_filters(&mut self, partial: FilterSet) {
        tracing::debug!(count = partial.len(), "Filters merged");
        self.current.merge(partial);
    }

    /// Remove a filter key entirely
    pub fn clear_filter(&mut self, key: &str) {
        if self.current.remove(key).is_some() {
            tracing::debug!(filter = %key, "Filter cleared");
        }
    }

    pub fn clear_all_filters(&mut self) {
        self.current.clear();
    }

    /// Restore the initial filter set
    pub fn reset_filters(&mut self) {
        self.current = self.initial.clone();
    }

    pub fn is_filter_active(&self, key: &str) -> bool {
        self.current.is_active(key)
    }

    pub fn has_active_filters(&self) -> bool {
        self.current.has_active()
    }

    pub fn active_filter_count(&self) -> usize {
        self.current.active_count()
    }

    /// Filter a collection with the current set
    pub fn apply(&self, data: &[Record]) -> Vec<Record> {
        apply_filters(data, &self.current, self.custom.as_ref())
    }
}
