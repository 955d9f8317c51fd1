//! Selection tracker and bulk actions

use crate::config::EngineConfig;
use crate::core::error::BulkError;
use crate::core::flag::InFlight;
use crate::core::record::{Record, RecordId};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;

/// Outcome of a bulk action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Counts for a "N of M selected" banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub total: usize,
    pub selected: usize,
    pub unselected: usize,
    pub percentage: u32,
}

/// Tracks which records of a collection are selected
///
/// Selection is by id, so it survives collection replacement; ids that no
/// longer exist simply stop appearing in [`Selection::selected_data`].
#[derive(Debug, Clone)]
pub struct Selection {
    id_field: String,
    data: Vec<Record>,
    selected: HashSet<RecordId>,
    error: Option<String>,
    processing: InFlight,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new("id")
    }
}

impl Selection {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            data: Vec::new(),
            selected: HashSet::new(),
            error: None,
            processing: InFlight::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.id_field.clone())
    }

    pub fn with_data(mut self, data: Vec<Record>) -> Self {
        self.data = data;
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// Replace the backing collection; the selected ids are kept
    pub fn set_data(&mut self, data: Vec<Record>) {
        self.data = data;
    }

    /// Drop selected ids that no longer appear in the collection
    pub fn retain_present(&mut self) {
        let present: HashSet<RecordId> = self
            .data
            .iter()
            .filter_map(|record| record.id(&self.id_field))
            .collect();
        self.selected.retain(|id| present.contains(id));
    }

    pub fn select_item(&mut self, id: impl Into<RecordId>) {
        self.selected.insert(id.into());
    }

    pub fn deselect_item(&mut self, id: impl Into<RecordId>) {
        self.selected.remove(&id.into());
    }

    pub fn toggle_item(&mut self, id: impl Into<RecordId>) {
        let id = id.into();
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self
            .data
            .iter()
            .filter_map(|record| record.id(&self.id_field))
            .collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn clear_selection(&mut self) {
        self.deselect_all();
    }

    pub fn is_selected(&self, id: impl Into<RecordId>) -> bool {
        self.selected.contains(&id.into())
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.selected.iter()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_all_selected(&self) -> bool {
        !self.data.is_empty() && self.selected.len() == self.data.len()
    }

    pub fn is_indeterminate(&self) -> bool {
        !self.selected.is_empty() && self.selected.len() < self.data.len()
    }

    /// Selected records, in collection order
    pub fn selected_data(&self) -> Vec<Record> {
        self.data
            .iter()
            .filter(|record| {
                record
                    .id(&self.id_field)
                    .is_some_and(|id| self.selected.contains(&id))
            })
            .cloned()
            .collect()
    }

    /// Run `action` over the selected records
    ///
    /// An empty selection fails without calling `action`. Failures are
    /// reported in the result and kept in [`Selection::error`], never returned
    /// as `Err`.
    pub async fn execute_bulk_action<F, Fut>(&mut self, action: F, args: Value) -> ActionResult
    where
        F: FnOnce(Vec<Record>, Value) -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        if self.selected.is_empty() {
            let err = BulkError::NoItemsSelected;
            self.error = Some(err.to_string());
            return ActionResult::failed(err.to_string());
        }

        let selected = self.selected_data();
        let count = selected.len();
        self.error = None;
        let outcome = {
            let _busy = self.processing.begin();
            action(selected, args).await
        };

        match outcome {
            Ok(result) => {
                tracing::debug!(count = count, "Bulk action completed");
                ActionResult::ok(result)
            }
            Err(e) => {
                let err = BulkError::ActionFailed {
                    message: e.to_string(),
                };
                tracing::warn!(count = count, error = %err, "Bulk action failed");
                self.error = Some(err.to_string());
                ActionResult::failed(err.to_string())
            }
        }
    }

    pub fn get_selection_summary(&self) -> SelectionSummary {
        let total = self.data.len();
        let selected = self.selected.len();
        let percentage = if total == 0 {
            0
        } else {
            (selected as f64 / total as f64 * 100.0).round() as u32
        };
        SelectionSummary {
            total,
            selected,
            unselected: total.saturating_sub(selected),
            percentage,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_processing(&self) -> bool {
        self.processing.get()
    }

    /// Handle for polling [`Selection::is_processing`] during an action
    pub fn processing_flag(&self) -> InFlight {
        self.processing.clone()
    }
}
