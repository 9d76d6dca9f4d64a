//! Core data models used throughout Incident Search.
//!
//! These types represent the error reports, expanded queries, and search
//! results that flow through the search pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Incident priority selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    P1,
    P2,
    P3,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::P1, Severity::P2, Severity::P3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::P1 => "P1",
            Severity::P2 => "P2",
            Severity::P3 => "P3",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P1" => Ok(Severity::P1),
            "P2" => Ok(Severity::P2),
            "P3" => Ok(Severity::P3),
            _ => Err(ValidationError::InvalidValue {
                field: "severity",
                value: s.trim().to_string(),
                expected: "P1, P2, P3",
            }),
        }
    }
}

/// Deployment environment the error was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Dev,
    Qa,
    Staging,
    Prod,
}

impl Environment {
    /// Form label, e.g. `"Prod"`.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Dev => "Dev",
            Environment::Qa => "QA",
            Environment::Staging => "Staging",
            Environment::Prod => "Prod",
        }
    }

    /// Lower-cased label used as a search term.
    pub fn term(&self) -> String {
        self.label().to_lowercase()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "qa" | "test" => Ok(Environment::Qa),
            "staging" | "stage" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(ValidationError::InvalidValue {
                field: "environment",
                value: s.trim().to_string(),
                expected: "Dev, QA, Staging, Prod",
            }),
        }
    }
}

/// One of the four search backends, in pipeline order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Confluence,
    Teams,
    Outlook,
    Local,
}

impl Source {
    /// Fixed search order. Ranking ties resolve in this order.
    pub const ALL: [Source; 4] = [
        Source::Confluence,
        Source::Teams,
        Source::Outlook,
        Source::Local,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Source::Confluence => "confluence",
            Source::Teams => "teams",
            Source::Outlook => "outlook",
            Source::Local => "local",
        }
    }

    /// Capitalized id, used on result cards and in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Confluence => "Confluence",
            Source::Teams => "Teams",
            Source::Outlook => "Outlook",
            Source::Local => "Local",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Source::Confluence => "📚",
            Source::Teams => "💬",
            Source::Outlook => "📧",
            Source::Local => "📄",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|src| src.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown source: '{}'. Available: confluence, teams, outlook, local",
                    s
                )
            })
    }
}

/// Raw form field values before validation.
///
/// Field names follow the form keys; every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub severity: String,
    pub error_code: String,
    pub error_description: String,
    pub app_name: String,
    pub environment: String,
    pub applicable_pool: String,
}

/// A validated, immutable error report. Seeds one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub severity: Severity,
    pub error_code: Option<String>,
    pub description: String,
    pub app_name: Option<String>,
    pub environment: Environment,
    pub applicable_pool: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Output of the query expander.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedQuery {
    pub original_query: String,
    pub expanded_query: String,
    /// Unique keywords in first-seen order.
    pub keywords: Vec<String>,
}

/// A corpus document cloned and perturbed for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    /// Nominally in `[0, 1]`. Jitter is floored at 0.5 but has no ceiling.
    pub relevance: f64,
    pub url: String,
    pub tags: Vec<String>,
    pub search_terms_matched: Vec<String>,
}

impl SearchResult {
    /// Relevance as a rounded percentage, e.g. `0.924` → `92`.
    pub fn percent(&self) -> i64 {
        (self.relevance * 100.0).round() as i64
    }
}

/// A search result tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub source: Source,
    #[serde(flatten)]
    pub result: SearchResult,
}

/// The single active session record.
///
/// Built by the pipeline, held by the session until the next submission
/// or a clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSearch {
    pub report: ErrorReport,
    #[serde(flatten)]
    pub expansion: ExpandedQuery,
    pub results: BTreeMap<Source, Vec<SearchResult>>,
    pub top_recommendations: Vec<RankedResult>,
    pub all_results: Vec<RankedResult>,
}

impl CurrentSearch {
    pub fn new(report: ErrorReport, expansion: ExpandedQuery) -> Self {
        Self {
            report,
            expansion,
            results: BTreeMap::new(),
            top_recommendations: Vec::new(),
            all_results: Vec::new(),
        }
    }

    pub fn original_query(&self) -> &str {
        &self.expansion.original_query
    }

    pub fn expanded_query(&self) -> &str {
        &self.expansion.expanded_query
    }

    /// Total number of results across all sources.
    pub fn result_count(&self) -> usize {
        self.all_results.len()
    }
}
