//! Search engine
//!
//! Free-text matching over record fields, an async lookup wrapper for
//! server-side search, query history and term highlighting.

use crate::config::{EngineConfig, HighlightConfig, SearchConfig};
use crate::core::error::SearchError;
use crate::core::flag::InFlight;
use crate::core::record::{FieldValue, Record};
use regex::RegexBuilder;
use std::future::Future;
use std::time::{Duration, Instant};

/// Entries kept in the "recent searches" list
pub const RECENT_SEARCHES_LIMIT: usize = 5;

/// Whether a record matches `query` in any of `fields`
///
/// With no fields, every string-valued field is searched. Named fields are
/// matched on their text form, so numeric ids can be searched too.
pub fn record_matches(record: &Record, query: &str, fields: &[String], case_sensitive: bool) -> bool {
    let needle = if case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };
    let hit = |text: &str| {
        if case_sensitive {
            text.contains(&needle)
        } else {
            text.to_lowercase().contains(&needle)
        }
    };

    if fields.is_empty() {
        record
            .iter()
            .filter_map(|(_, value)| value.as_str())
            .any(hit)
    } else {
        fields.iter().any(|field| match record.value(field) {
            FieldValue::Null | FieldValue::Json(_) => false,
            FieldValue::String(s) => hit(s),
            other => hit(&other.to_text()),
        })
    }
}

/// Free-text filtering with an explicit configuration
///
/// Queries shorter than `config.min_length` characters leave the data
/// unchanged; they do not produce an empty result.
pub fn filter_records(
    data: &[Record],
    query: &str,
    fields: &[String],
    config: &SearchConfig,
) -> Vec<Record> {
    if query.chars().count() < config.min_length || query.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .filter(|record| record_matches(record, query, fields, config.case_sensitive))
        .cloned()
        .collect()
}

/// Rate-limit gate for keystroke-driven search
///
/// The caller's event loop reports input with [`Debounce::call`] and polls
/// [`Debounce::ready`]; the lookup runs once the input has been quiet for
/// `wait`.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    last_call: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_call: None,
        }
    }

    /// Record an input event at `now`, restarting the quiet period
    pub fn call(&mut self, now: Instant) {
        self.last_call = Some(now);
    }

    /// Whether a call is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.last_call.is_some()
    }

    /// Fire the pending call if the quiet period has elapsed
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_call {
            Some(last) if now.saturating_duration_since(last) >= self.wait => {
                self.last_call = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.last_call = None;
    }
}

/// Search state owned by one list session
#[derive(Debug, Clone)]
pub struct Search {
    config: SearchConfig,
    highlight: HighlightConfig,
    query: String,
    results: Vec<Record>,
    history: Vec<String>,
    recent: Vec<String>,
    error: Option<String>,
    searching: InFlight,
    debounce: Debounce,
}

impl Default for Search {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Search {
    pub fn new(config: SearchConfig) -> Self {
        let debounce = Debounce::new(Duration::from_millis(config.debounce_ms));
        Self {
            config,
            highlight: HighlightConfig::default(),
            query: String::new(),
            results: Vec::new(),
            history: Vec::new(),
            recent: Vec::new(),
            error: None,
            searching: InFlight::new(),
            debounce,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut search = Self::new(config.search.clone());
        search.highlight = config.highlight.clone();
        search
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Whether a query is long enough to search
    pub fn is_query_active(&self, query: &str) -> bool {
        !query.is_empty() && query.chars().count() >= self.config.min_length
    }

    /// Whether the current query is active
    pub fn is_active(&self) -> bool {
        self.is_query_active(&self.query)
    }

    /// Reset query, results and error
    pub fn clear_search(&mut self) {
        self.query.clear();
        self.results.clear();
        self.error = None;
        self.debounce.cancel();
    }

    /// Client-side search over `data`
    pub fn filter_data(&self, data: &[Record], query: &str, fields: &[String]) -> Vec<Record> {
        filter_records(data, query, fields, &self.config)
    }

    /// Run a caller-supplied lookup (e.g. server-side search)
    ///
    /// Short queries return an empty result without calling `lookup`. On
    /// success the trimmed query goes into the history (when enabled). On
    /// failure the error is recorded and returned to the caller.
    pub async fn search<F, Fut>(&mut self, query: &str, lookup: F) -> anyhow::Result<Vec<Record>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<Record>>>,
    {
        self.query = query.to_string();
        if !self.is_query_active(query) {
            self.results.clear();
            return Ok(Vec::new());
        }

        self.error = None;
        let outcome = {
            let _busy = self.searching.begin();
            lookup(query.to_string()).await
        };

        match outcome {
            Ok(records) => {
                tracing::debug!(query = %query, results = records.len(), "Search completed");
                self.results = records.clone();
                if self.config.enable_history {
                    self.add_to_history(query);
                }
                Ok(records)
            }
            Err(e) => {
                let err = SearchError::LookupFailed {
                    query: query.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!(error = %err, "Search failed");
                self.error = Some(err.to_string());
                Err(e)
            }
        }
    }

    /// Results of the last successful lookup
    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching.get()
    }

    /// Shared handle on the in-flight flag
    pub fn searching_flag(&self) -> InFlight {
        self.searching.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Raw string values in `fields` matching the current query
    ///
    /// Deduplicated by text, capped at `max_count`.
    pub fn get_suggestions(&self, data: &[Record], fields: &[String], max_count: usize) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        if !self.is_active() || max_count == 0 {
            return suggestions;
        }
        let needle = if self.config.case_sensitive {
            self.query.clone()
        } else {
            self.query.to_lowercase()
        };

        for record in data {
            for field in fields {
                let Some(text) = record.value(field).as_str() else {
                    continue;
                };
                let hit = if self.config.case_sensitive {
                    text.contains(&needle)
                } else {
                    text.to_lowercase().contains(&needle)
                };
                if hit && !suggestions.iter().any(|s| s == text) {
                    suggestions.push(text.to_string());
                    if suggestions.len() >= max_count {
                        return suggestions;
                    }
                }
            }
        }
        suggestions
    }

    /// Previously submitted queries, most recent first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The last few queries, most recent first
    pub fn recent_searches(&self) -> &[String] {
        &self.recent
    }

    pub fn add_to_history(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        push_front_capped(&mut self.history, query, self.config.max_history);
        push_front_capped(&mut self.recent, query, RECENT_SEARCHES_LIMIT);
    }

    pub fn remove_from_history(&mut self, item: &str) {
        self.history.retain(|entry| entry != item);
        self.recent.retain(|entry| entry != item);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.recent.clear();
    }

    /// Wrap every occurrence of `term` in `text` with the highlight markers
    pub fn highlight_search_term(&self, text: &str, term: &str) -> String {
        if text.is_empty() || term.is_empty() {
            return text.to_string();
        }
        let Ok(re) = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(!self.config.case_sensitive)
            .build()
        else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", self.highlight.open, &caps[0], self.highlight.close)
        })
        .into_owned()
    }

    pub fn debounce(&mut self) -> &mut Debounce {
        &mut self.debounce
    }
}

fn push_front_capped(list: &mut Vec<String>, item: &str, cap: usize) {
    list.retain(|entry| entry != item);
    list.insert(0, item.to_string());
    list.truncate(cap);
}
