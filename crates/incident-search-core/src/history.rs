//! Saved-search history.
//!
//! A newest-first list capped at [`HISTORY_CAPACITY`] entries. The list is
//! persisted as a whole JSON snapshot under [`HISTORY_KEY`].

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CurrentSearch, Severity};

/// Maximum number of saved searches kept.
pub const HISTORY_CAPACITY: usize = 10;

/// Store key the history snapshot lives under.
pub const HISTORY_KEY: &str = "searchHistory";

/// Characters of the query shown in a history row.
const QUERY_PREVIEW_CHARS: usize = 50;

/// A persisted summary of a saved search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Milliseconds since the epoch at save time. Unique within a list.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub severity: Severity,
    pub results_count: usize,
}

impl HistoryEntry {
    pub fn from_search(search: &CurrentSearch, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: saved_at.timestamp_millis(),
            timestamp: saved_at,
            query: search.original_query().to_string(),
            severity: search.report.severity,
            results_count: search.result_count(),
        }
    }

    /// `"P1 - 9 results"`.
    pub fn headline(&self) -> String {
        format!("{} - {} results", self.severity, self.results_count)
    }

    /// Save date in local time.
    pub fn local_date(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d")
            .to_string()
    }

    /// First 50 characters of the query followed by `...`.
    pub fn query_preview(&self) -> String {
        let head: String = self.query.chars().take(QUERY_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// Newest-first history list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored snapshot.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut history: SearchHistory = serde_json::from_str(json)?;
        history.entries.truncate(HISTORY_CAPACITY);
        Ok(history)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    /// Insert at the front, dropping the oldest entries beyond capacity.
    ///
    /// An id that would collide with the newest entry is bumped so ids stay
    /// unique when two saves land in the same millisecond.
    pub fn push(&mut self, mut entry: HistoryEntry) -> &HistoryEntry {
        if let Some(newest) = self.entries.first() {
            if entry.id <= newest.id {
                entry.id = newest.id + 1;
            }
        }
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
