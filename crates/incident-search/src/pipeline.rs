//! Search pipeline orchestrator.
//!
//! Drives one submission through a fixed sequence of states:
//!
//! ```text
//! Idle ─▶ Expanding ─▶ GraphInit ─▶ Searching ─▶ Aggregating ─▶ Rendering ─▶ Idle
//!                                      │
//!                      confluence ─▶ teams ─▶ outlook ─▶ local
//! ```
//!
//! Every transition is unconditional. A failure in any stage aborts the
//! run: the loading indicator is hidden, one generic failure notice goes to
//! the presenter, and the orchestrator returns to `Idle` without handing
//! back a partial search.
//!
//! Suspension happens only at [`Delay`] points and at each source search.
//! Sources are searched strictly one after another so results land in
//! source order before aggregation begins.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;

use incident_search_core::aggregate;
use incident_search_core::delay::Delay;
use incident_search_core::expand;
use incident_search_core::graph::{NodeStatus, WorkflowGraph};
use incident_search_core::models::{CurrentSearch, ErrorReport, SearchResult, Source};
use incident_search_core::simulate::{self, Perturbation};

use crate::config::PipelineConfig;
use crate::progress::{PipelineEvent, Presenter, FAILURE_MESSAGE};

/// Orchestrator state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Expanding,
    GraphInit,
    Searching,
    Aggregating,
    Rendering,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Expanding => "expanding",
            PipelineState::GraphInit => "graph_init",
            PipelineState::Searching => "searching",
            PipelineState::Aggregating => "aggregating",
            PipelineState::Rendering => "rendering",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that aborted. `stage` is the state the pipeline was in.
#[derive(Debug, Error)]
#[error("search failed during {stage}: {cause:#}")]
pub struct PipelineError {
    pub stage: PipelineState,
    pub cause: anyhow::Error,
}

/// Where per-source results come from.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    async fn search(
        &self,
        source: Source,
        report: &ErrorReport,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<Vec<SearchResult>>;
}

/// Searches the built-in mock corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend {
    pub perturbation: Perturbation,
}

impl MockBackend {
    pub fn new(perturbation: Perturbation) -> Self {
        Self { perturbation }
    }
}

#[async_trait]
impl SourceBackend for MockBackend {
    async fn search(
        &self,
        source: Source,
        report: &ErrorReport,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<Vec<SearchResult>> {
        Ok(simulate::search_source(
            source.id(),
            report,
            &self.perturbation,
            rng,
        ))
    }
}

/// Real timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

pub struct Pipeline<'a> {
    config: PipelineConfig,
    delay: &'a dyn Delay,
    presenter: &'a dyn Presenter,
    backend: &'a dyn SourceBackend,
    rng: StdRng,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: PipelineConfig,
        delay: &'a dyn Delay,
        presenter: &'a dyn Presenter,
        backend: &'a dyn SourceBackend,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            delay,
            presenter,
            backend,
            rng,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one submission to completion.
    ///
    /// On success the presenter has already received `Rendered` and
    /// `Succeeded`. On failure it has received `Failed` and no search is
    /// returned.
    pub async fn run(&mut self, report: ErrorReport) -> Result<CurrentSearch, PipelineError> {
        self.presenter.report(PipelineEvent::Loading(true));

        let outcome = match self.execute(report).await {
            Ok(search) => {
                self.presenter.report(PipelineEvent::Succeeded);
                Ok(search)
            }
            Err(cause) => {
                let stage = self.state;
                tracing::error!(stage = %stage, error = %format!("{:#}", cause), "search pipeline failed");
                self.presenter.report(PipelineEvent::Failed {
                    message: FAILURE_MESSAGE,
                });
                Err(PipelineError { stage, cause })
            }
        };

        self.presenter.report(PipelineEvent::Loading(false));
        self.transition(PipelineState::Idle);
        outcome
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.presenter.report(PipelineEvent::StateChanged(next));
    }

    async fn execute(&mut self, report: ErrorReport) -> Result<CurrentSearch> {
        self.transition(PipelineState::Expanding);
        let expansion = expand::expand(&report);
        self.delay.sleep(self.config.expansion_delay()).await;
        self.presenter
            .report(PipelineEvent::QueryExpanded(&expansion));

        let mut search = CurrentSearch::new(report, expansion);

        self.transition(PipelineState::GraphInit);
        self.delay.sleep(self.config.graph_delay()).await;
        let mut graph = WorkflowGraph::search_workflow();
        self.presenter.report(PipelineEvent::GraphReady(&graph));

        self.transition(PipelineState::Searching);
        let total = Source::ALL.len();
        for (i, source) in Source::ALL.into_iter().enumerate() {
            self.set_node(&mut graph, source, NodeStatus::Processing);

            let pause = self.search_pause();
            self.delay.sleep(pause).await;

            let results = self
                .backend
                .search(source, &search.report, &mut self.rng)
                .await?;
            tracing::debug!(
                source = source.id(),
                delay_ms = pause.as_millis() as u64,
                results = results.len(),
                "source searched"
            );
            search.results.insert(source, results);

            self.set_node(&mut graph, source, NodeStatus::Completed);
            let percent = ((i + 1) * 100 / total) as u8;
            self.presenter.report(PipelineEvent::Progress { percent });
        }

        self.transition(PipelineState::Aggregating);
        let (top, all) = aggregate::aggregate(&search.results);
        search.top_recommendations = top;
        search.all_results = all;

        self.transition(PipelineState::Rendering);
        self.presenter.report(PipelineEvent::Rendered(&search));

        Ok(search)
    }

    fn set_node(&self, graph: &mut WorkflowGraph, source: Source, status: NodeStatus) {
        graph.set_status(source.id(), status);
        self.presenter.report(PipelineEvent::NodeStatus {
            node: source.id(),
            status,
        });
    }

    /// Base pause plus uniform jitter in `[0, search_jitter_ms]`.
    fn search_pause(&mut self) -> Duration {
        let extra = if self.config.search_jitter_ms > 0 {
            self.rng.gen_range(0..=self.config.search_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.config.search_delay_ms.saturating_add(extra))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use incident_search_core::delay::NoDelay;
    use incident_search_core::expand::TERM_SEPARATOR;
    use incident_search_core::models::{Environment, Severity};
    use std::sync::Mutex;

    /// Records every event as a short string.
    #[derive(Default)]
    pub(crate) struct RecordingPresenter {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingPresenter {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Presenter for RecordingPresenter {
        fn report(&self, event: PipelineEvent<'_>) {
            let line = match event {
                PipelineEvent::Loading(v) => format!("loading:{}", v),
                PipelineEvent::StateChanged(s) => format!("state:{}", s),
                PipelineEvent::QueryExpanded(_) => "expanded".to_string(),
                PipelineEvent::GraphReady(g) => format!("graph:{}", g.nodes.len()),
                PipelineEvent::NodeStatus { node, status } => {
                    format!("node:{}:{}", node, status.as_str())
                }
                PipelineEvent::Progress { percent } => format!("progress:{}", percent),
                PipelineEvent::Rendered(s) => format!("rendered:{}", s.result_count()),
                PipelineEvent::Succeeded => "succeeded".to_string(),
                PipelineEvent::Failed { message } => format!("failed:{}", message),
                PipelineEvent::Cleared => "cleared".to_string(),
            };
            self.events.lock().unwrap().push(line);
        }
    }

    struct FailingBackend {
        fail_on: Source,
    }

    #[async_trait]
    impl SourceBackend for FailingBackend {
        async fn search(
            &self,
            source: Source,
            report: &ErrorReport,
            rng: &mut (dyn RngCore + Send),
        ) -> Result<Vec<SearchResult>> {
            if source == self.fail_on {
                anyhow::bail!("{} unavailable", source.id());
            }
            MockBackend::default().search(source, report, rng).await
        }
    }

    pub(crate) fn test_config() -> PipelineConfig {
        PipelineConfig {
            seed: Some(42),
            ..PipelineConfig::default()
        }
    }

    pub(crate) fn timeout_report() -> ErrorReport {
        ErrorReport {
            severity: Severity::P1,
            error_code: Some("ERR_CONNECTION_TIMEOUT".to_string()),
            description: "Database connection timeout after 30 seconds".to_string(),
            app_name: Some("UserPortal".to_string()),
            environment: Environment::Prod,
            applicable_pool: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn end_to_end_timeout_scenario() {
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::new(test_config().perturbation());
        let mut pipeline = Pipeline::new(test_config(), &NoDelay, &presenter, &backend);

        let search = pipeline.run(timeout_report()).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let terms: Vec<&str> = search.expanded_query().split(TERM_SEPARATOR).collect();
        assert_eq!(
            terms,
            vec![
                "ERR_CONNECTION_TIMEOUT",
                "UserPortal",
                "prod",
                "critical",
                "urgent",
                "production down",
                "outage",
                "connection timeout",
                "network timeout",
                "database timeout",
                "response timeout",
                "db connection",
                "sql",
                "query performance",
                "connection pool",
            ]
        );

        assert_eq!(search.results.len(), 4);
        for source in Source::ALL {
            assert!(search.results.contains_key(&source));
        }
        assert_eq!(search.result_count(), 9);
        for r in &search.all_results {
            assert!(r.result.relevance >= 0.5);
        }

        let mut tagged: Vec<&str> = search
            .all_results
            .iter()
            .filter(|r| r.result.tags.iter().any(|t| t == "database" || t == "timeout"))
            .map(|r| r.result.title.as_str())
            .collect();
        tagged.sort_unstable();
        assert_eq!(
            tagged,
            vec![
                "Database Connection Timeout Troubleshooting Guide",
                "Database timeout issue - RESOLVED",
                "Production Database Configuration Best Practices",
                "Production incident post-mortem",
                "RE: Urgent - Database Performance Issues",
                "Weekly Infrastructure Report",
                "db_troubleshooting_runbook.pdf",
            ]
        );

        assert_eq!(search.top_recommendations.len(), 3);
        let best = &search.top_recommendations[0].result;
        for r in &search.all_results {
            assert!(best.relevance >= r.result.relevance);
        }
        for pair in search.top_recommendations.windows(2) {
            assert!(pair[0].result.relevance >= pair[1].result.relevance);
        }
    }

    #[tokio::test]
    async fn event_sequence() {
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut pipeline = Pipeline::new(test_config(), &NoDelay, &presenter, &backend);
        pipeline.run(timeout_report()).await.unwrap();

        let events = presenter.events();
        assert_eq!(events.first().map(String::as_str), Some("loading:true"));
        assert_eq!(
            &events[events.len() - 3..],
            &["succeeded", "loading:false", "state:idle"]
        );

        let states: Vec<&str> = events
            .iter()
            .filter_map(|e| e.strip_prefix("state:"))
            .collect();
        assert_eq!(
            states,
            vec!["expanding", "graph_init", "searching", "aggregating", "rendering", "idle"]
        );

        let progress: Vec<&str> = events
            .iter()
            .filter_map(|e| e.strip_prefix("progress:"))
            .collect();
        assert_eq!(progress, vec!["25", "50", "75", "100"]);

        let nodes: Vec<&str> = events
            .iter()
            .filter_map(|e| e.strip_prefix("node:"))
            .collect();
        assert_eq!(nodes[0], "confluence:processing");
        assert_eq!(nodes[1], "confluence:completed");
        assert_eq!(nodes[7], "local:completed");

        let expanded = events.iter().position(|e| e == "expanded").unwrap();
        let graph = events.iter().position(|e| e == "graph:7").unwrap();
        let rendered = events.iter().position(|e| e == "rendered:9").unwrap();
        assert!(expanded < graph && graph < rendered);
    }

    #[tokio::test]
    async fn failure_aborts_and_resets() {
        let presenter = RecordingPresenter::default();
        let backend = FailingBackend {
            fail_on: Source::Outlook,
        };
        let mut pipeline = Pipeline::new(test_config(), &NoDelay, &presenter, &backend);

        let err = pipeline.run(timeout_report()).await.unwrap_err();
        assert_eq!(err.stage, PipelineState::Searching);
        assert!(err.to_string().contains("outlook unavailable"));
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let events = presenter.events();
        assert!(events.contains(&"loading:false".to_string()));
        assert!(events.contains(&format!("failed:{}", FAILURE_MESSAGE)));
        assert!(!events.iter().any(|e| e.starts_with("rendered")));
        assert!(!events.contains(&"succeeded".to_string()));
        // Two sources finished before the failure.
        assert!(!events.contains(&"progress:75".to_string()));
        assert!(events.contains(&"progress:50".to_string()));
    }

    #[tokio::test]
    async fn seeded_runs_repeat() {
        let backend = MockBackend::default();
        let presenter = RecordingPresenter::default();
        let a = Pipeline::new(test_config(), &NoDelay, &presenter, &backend)
            .run(timeout_report())
            .await
            .unwrap();
        let b = Pipeline::new(test_config(), &NoDelay, &presenter, &backend)
            .run(timeout_report())
            .await
            .unwrap();
        assert_eq!(a.results, b.results);
    }

    #[test]
    fn pause_stays_in_window() {
        let presenter = RecordingPresenter::default();
        let backend = MockBackend::default();
        let mut pipeline = Pipeline::new(test_config(), &NoDelay, &presenter, &backend);
        for _ in 0..100 {
            let ms = pipeline.search_pause().as_millis();
            assert!((800..=1200).contains(&ms));
        }

        let mut huge = test_config();
        huge.search_delay_ms = u64::MAX;
        let mut pipeline = Pipeline::new(huge, &NoDelay, &presenter, &backend);
        assert_eq!(pipeline.search_pause(), Duration::from_millis(u64::MAX));

        let fast = test_config().without_delays();
        let mut pipeline = Pipeline::new(fast, &NoDelay, &presenter, &backend);
        assert_eq!(pipeline.search_pause(), Duration::ZERO);
    }
}
