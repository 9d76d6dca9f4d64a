//! Interactive session state.
//!
//! A [`Session`] owns the single current search and the saved-search
//! history. It replaces a process-wide mutable record: every operation
//! takes the session explicitly, and `submit` needs `&mut self`, so a
//! second submission cannot start while one is running.
//!
//! The history is loaded from the [`KeyValueStore`] once, in
//! [`Session::start`], and written back as a whole snapshot on each save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use thiserror::Error;

use incident_search_core::error::{SessionError, ValidationError};
use incident_search_core::form;
use incident_search_core::history::{HistoryEntry, SearchHistory, HISTORY_KEY};
use incident_search_core::models::{CurrentSearch, FormInput};
use incident_search_core::store::KeyValueStore;

use crate::export::{self, ReportRenderer};
use crate::pipeline::{Pipeline, PipelineError};
use crate::progress::{PipelineEvent, Presenter};

/// Why a submission produced no search.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Load the saved history. A missing key is an empty history; a value
/// that does not parse is an error.
pub async fn load_history(store: &dyn KeyValueStore) -> Result<SearchHistory> {
    match store.get(HISTORY_KEY).await? {
        Some(json) => SearchHistory::from_json(&json)
            .with_context(|| format!("Stored '{}' value is not a valid history list", HISTORY_KEY)),
        None => Ok(SearchHistory::new()),
    }
}

pub struct Session<'a> {
    pipeline: Pipeline<'a>,
    store: &'a dyn KeyValueStore,
    presenter: &'a dyn Presenter,
    history: SearchHistory,
    current: Option<CurrentSearch>,
}

impl<'a> Session<'a> {
    pub async fn start(
        pipeline: Pipeline<'a>,
        store: &'a dyn KeyValueStore,
        presenter: &'a dyn Presenter,
    ) -> Result<Self> {
        let history = load_history(store).await?;
        tracing::debug!(entries = history.len(), "history loaded");
        Ok(Self {
            pipeline,
            store,
            presenter,
            history,
            current: None,
        })
    }

    pub fn current(&self) -> Option<&CurrentSearch> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Validate the form and run the pipeline.
    ///
    /// A validation error leaves the current search untouched. Once the
    /// pipeline starts the previous search is dropped, and a failed run
    /// leaves no current search.
    pub async fn submit(&mut self, input: &FormInput) -> Result<&CurrentSearch, SubmitError> {
        let report = form::validate(input, Utc::now())
            .inspect_err(|e| tracing::debug!(field = e.field(), "form rejected"))?;
        self.current = None;
        let search = self.pipeline.run(report).await?;
        let search = self.current.insert(search);
        Ok(&*search)
    }

    /// Save the current search to the front of the history.
    pub async fn save(&mut self) -> Result<HistoryEntry> {
        let search = self.current.as_ref().ok_or(SessionError::NoActiveSearch {
            action: "save",
        })?;

        let mut updated = self.history.clone();
        let entry = updated
            .push(HistoryEntry::from_search(search, Utc::now()))
            .clone();
        let json = updated.to_json().context("Failed to serialize history")?;
        self.store
            .set(HISTORY_KEY, &json)
            .await
            .context("Failed to persist history")?;
        self.history = updated;

        tracing::info!(id = entry.id, entries = self.history.len(), "search saved");
        Ok(entry)
    }

    /// Export the current search as a report file in `dir`.
    pub fn export(&self, renderer: &dyn ReportRenderer, dir: &Path) -> Result<PathBuf> {
        let search = self.current.as_ref().ok_or(SessionError::NoActiveSearch {
            action: "export",
        })?;
        export::export_report(search, renderer, dir, Local::now())
    }

    /// Drop the current search and hide every result section.
    pub fn clear(&mut self) {
        self.current = None;
        self.presenter.report(PipelineEvent::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::TextRenderer;
    use crate::pipeline::tests::{test_config, RecordingPresenter};
    use crate::pipeline::MockBackend;
    use incident_search_core::delay::NoDelay;
    use incident_search_core::history::HISTORY_CAPACITY;
    use incident_search_core::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn timeout_form() -> FormInput {
        FormInput {
            severity: "P1".to_string(),
            error_code: "ERR_CONNECTION_TIMEOUT".to_string(),
            error_description: "Database connection timeout after 30 seconds".to_string(),
            app_name: "UserPortal".to_string(),
            environment: "Prod".to_string(),
            applicable_pool: String::new(),
        }
    }

    async fn session<'a>(
        store: &'a InMemoryStore,
        presenter: &'a RecordingPresenter,
        backend: &'a MockBackend,
    ) -> Session<'a> {
        let pipeline = Pipeline::new(test_config(), &NoDelay, presenter, backend);
        Session::start(pipeline, store, presenter).await.unwrap()
    }

    #[tokio::test]
    async fn save_without_search_is_rejected() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;

        let err = s.save().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<SessionError>(),
            Some(&SessionError::NoActiveSearch { action: "save" })
        );
        assert_eq!(err.to_string(), "No search data to save");
        assert!(s.history().is_empty());
        assert!(store.get(HISTORY_KEY).await.unwrap().is_none());

        let tmp = TempDir::new().unwrap();
        let err = s.export(&TextRenderer, tmp.path()).unwrap_err();
        assert_eq!(err.to_string(), "No search data to export");
    }

    #[tokio::test]
    async fn validation_error_does_not_run_pipeline() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;

        let mut form = timeout_form();
        form.error_description = "   ".to_string();
        let err = s.submit(&form).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::MissingField {
                field: "errorDescription"
            })
        ));
        assert_eq!(err.to_string(), "Please fill in the error description field.");
        assert!(presenter.events().is_empty());
        assert!(s.current().is_none());
    }

    #[tokio::test]
    async fn submit_save_and_reload() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;

        let count = s.submit(&timeout_form()).await.unwrap().result_count();
        assert_eq!(count, 9);

        let entry = s.save().await.unwrap();
        assert_eq!(entry.results_count, 9);
        assert_eq!(
            entry.query,
            "P1 ERR_CONNECTION_TIMEOUT Database connection timeout after 30 seconds UserPortal Prod"
        );

        let reloaded = load_history(&store).await.unwrap();
        assert_eq!(reloaded.entries(), s.history().entries());
    }

    #[tokio::test]
    async fn history_never_exceeds_capacity() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;
        s.submit(&timeout_form()).await.unwrap();

        let mut ids = Vec::new();
        for _ in 0..12 {
            ids.push(s.save().await.unwrap().id);
            assert!(s.history().len() <= HISTORY_CAPACITY);
        }
        assert_eq!(s.history().len(), HISTORY_CAPACITY);

        let kept: Vec<i64> = s.history().entries().iter().map(|e| e.id).collect();
        let expected: Vec<i64> = ids.iter().rev().take(HISTORY_CAPACITY).copied().collect();
        assert_eq!(kept, expected);
    }

    #[tokio::test]
    async fn clear_resets_current_search() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;
        s.submit(&timeout_form()).await.unwrap();
        assert!(s.current().is_some());

        s.clear();
        assert!(s.current().is_none());
        assert_eq!(presenter.events().last().map(String::as_str), Some("cleared"));
        assert!(s.save().await.is_err());
    }

    #[tokio::test]
    async fn corrupt_history_fails_start() {
        let store = InMemoryStore::new();
        store.set(HISTORY_KEY, "{not json").await.unwrap();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let pipeline = Pipeline::new(test_config(), &NoDelay, &presenter, &backend);
        let err = Session::start(pipeline, &store, &presenter)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("not a valid history list"));
    }

    #[tokio::test]
    async fn export_current_search() {
        let store = InMemoryStore::new();
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut s = session(&store, &presenter, &backend).await;
        s.submit(&timeout_form()).await.unwrap();

        let tmp = TempDir::new().unwrap();
        let path = s.export(&TextRenderer, tmp.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Top 3 Recommendations:"));
    }
}
