//! Pipeline progress and result presentation.
//!
//! The orchestrator never prints. It emits [`PipelineEvent`]s to a
//! [`Presenter`], which decides what the user sees:
//!
//! | Presenter | stderr | stdout |
//! |-----------|--------|--------|
//! | [`TerminalPresenter`] | status, diagram, progress | expansion, results |
//! | [`JsonPresenter`] | one JSON object per event | final search as JSON |
//! | [`SilentPresenter`] | nothing | nothing |
//!
//! Progress goes to **stderr** so stdout remains parseable for scripts.

use std::io::Write;

use incident_search_core::graph::{NodeStatus, WorkflowGraph};
use incident_search_core::models::{CurrentSearch, ExpandedQuery};

use crate::pipeline::PipelineState;
use crate::render;

/// Message shown once a run completes.
pub const SUCCESS_MESSAGE: &str = "Search completed successfully!";

/// Single user-visible notice for any pipeline failure.
pub const FAILURE_MESSAGE: &str = "An error occurred during search. Please try again.";

/// A single notification from the pipeline or session.
#[derive(Clone, Copy, Debug)]
pub enum PipelineEvent<'a> {
    /// Show (`true`) or hide (`false`) the loading indicator. Submission is
    /// disabled while shown.
    Loading(bool),
    StateChanged(PipelineState),
    QueryExpanded(&'a ExpandedQuery),
    GraphReady(&'a WorkflowGraph),
    NodeStatus { node: &'a str, status: NodeStatus },
    /// Sources searched so far, 0–100.
    Progress { percent: u8 },
    Rendered(&'a CurrentSearch),
    Succeeded,
    Failed { message: &'a str },
    /// The current search was cleared; hide every result section.
    Cleared,
}

/// Receives pipeline events. Implementations write to stderr/stdout.
pub trait Presenter: Send + Sync {
    fn report(&self, event: PipelineEvent<'_>);
}

fn write_err(text: &str) {
    let mut err = std::io::stderr().lock();
    let _ = err.write_all(text.as_bytes());
    let _ = err.flush();
}

fn write_out(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

/// Human-friendly output: "search  teams  processing", "progress  50%".
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn report(&self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::Loading(true) => write_err("searching...\n"),
            PipelineEvent::Loading(false) => {}
            PipelineEvent::StateChanged(_) => {}
            PipelineEvent::QueryExpanded(q) => write_out(&format!("{}\n", render::expansion(q))),
            PipelineEvent::GraphReady(g) => write_err(&render::graph(g)),
            PipelineEvent::NodeStatus { node, status } => {
                write_err(&format!("search  {}  {}\n", node, status.as_str()))
            }
            PipelineEvent::Progress { percent } => write_err(&format!("progress  {}%\n", percent)),
            PipelineEvent::Rendered(search) => write_out(&render::results(search)),
            PipelineEvent::Succeeded => write_err(&format!("{}\n", SUCCESS_MESSAGE)),
            PipelineEvent::Failed { message } => write_err(&format!("error: {}\n", message)),
            PipelineEvent::Cleared => write_err("cleared\n"),
        }
    }
}

/// Machine-readable output: one JSON object per line on stderr.
pub struct JsonPresenter;

impl JsonPresenter {
    fn event_json(event: &PipelineEvent<'_>) -> serde_json::Value {
        match event {
            PipelineEvent::Loading(visible) => serde_json::json!({
                "event": "loading",
                "visible": visible
            }),
            PipelineEvent::StateChanged(state) => serde_json::json!({
                "event": "state",
                "state": state.to_string()
            }),
            PipelineEvent::QueryExpanded(q) => serde_json::json!({
                "event": "expanded",
                "query": q
            }),
            PipelineEvent::GraphReady(g) => serde_json::json!({
                "event": "graph",
                "nodes": g.nodes.len(),
                "edges": g.edges.len()
            }),
            PipelineEvent::NodeStatus { node, status } => serde_json::json!({
                "event": "node",
                "node": node,
                "status": status.as_str()
            }),
            PipelineEvent::Progress { percent } => serde_json::json!({
                "event": "progress",
                "percent": percent
            }),
            PipelineEvent::Rendered(search) => serde_json::json!({
                "event": "rendered",
                "results": search.result_count()
            }),
            PipelineEvent::Succeeded => serde_json::json!({
                "event": "succeeded",
                "message": SUCCESS_MESSAGE
            }),
            PipelineEvent::Failed { message } => serde_json::json!({
                "event": "failed",
                "message": message
            }),
            PipelineEvent::Cleared => serde_json::json!({ "event": "cleared" }),
        }
    }
}

impl Presenter for JsonPresenter {
    fn report(&self, event: PipelineEvent<'_>) {
        if let Ok(line) = serde_json::to_string(&Self::event_json(&event)) {
            write_err(&format!("{}\n", line));
        }
        if let PipelineEvent::Rendered(search) = event {
            if let Ok(body) = serde_json::to_string_pretty(search) {
                write_out(&format!("{}\n", body));
            }
        }
    }
}

/// No-op presenter when output is disabled.
pub struct SilentPresenter;

impl Presenter for SilentPresenter {
    fn report(&self, _event: PipelineEvent<'_>) {}
}

/// Presentation mode for the CLI: off, human (terminal), or JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: terminal output when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    pub fn presenter(&self) -> Box<dyn Presenter> {
        match self {
            ProgressMode::Off => Box::new(SilentPresenter),
            ProgressMode::Human => Box::new(TerminalPresenter),
            ProgressMode::Json => Box::new(JsonPresenter),
        }
    }
}
