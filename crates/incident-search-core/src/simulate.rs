//! Per-source search simulation over the mock corpus.
//!
//! Each corpus entry is cloned, its relevance perturbed by uniform jitter
//! and floored, and the report's matched terms computed.
//!
//! The floor has no matching ceiling, so a perturbed relevance can exceed
//! `1.0`. Callers must not assume an upper bound.

use rand::Rng;

use crate::corpus::{self, CorpusEntry};
use crate::models::{ErrorReport, SearchResult};

/// Jitter and floor applied to corpus relevance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    /// Half-width of the uniform jitter window.
    pub jitter: f64,
    /// Minimum relevance after jitter.
    pub floor: f64,
}

impl Default for Perturbation {
    fn default() -> Self {
        Self {
            jitter: 0.05,
            floor: 0.5,
        }
    }
}

impl Perturbation {
    /// Perturb one relevance score.
    pub fn apply<R: Rng + ?Sized>(&self, relevance: f64, rng: &mut R) -> f64 {
        let delta = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..self.jitter)
        } else {
            0.0
        };
        (relevance + delta).max(self.floor)
    }
}

/// Search one source by id. Unknown ids yield no results.
pub fn search_source<R: Rng + ?Sized>(
    source_id: &str,
    report: &ErrorReport,
    perturbation: &Perturbation,
    rng: &mut R,
) -> Vec<SearchResult> {
    search_entries(corpus::lookup(source_id), report, perturbation, rng)
}

/// Clone and perturb a slice of corpus entries, preserving order.
pub fn search_entries<R: Rng + ?Sized>(
    entries: &[CorpusEntry],
    report: &ErrorReport,
    perturbation: &Perturbation,
    rng: &mut R,
) -> Vec<SearchResult> {
    entries
        .iter()
        .map(|entry| SearchResult {
            title: entry.title.to_string(),
            snippet: entry.snippet.to_string(),
            relevance: perturbation.apply(entry.relevance, &mut *rng),
            url: entry.url.to_string(),
            tags: entry.tags.iter().map(|t| t.to_string()).collect(),
            search_terms_matched: matched_terms(entry, report),
        })
        .collect()
}

/// Terms from the report that this entry matches.
///
/// `timeout` and `database` match when both the description and the
/// entry's tags mention them; the error code matches against the title.
pub fn matched_terms(entry: &CorpusEntry, report: &ErrorReport) -> Vec<String> {
    let mut terms = Vec::new();
    let description = report.description.to_lowercase();

    for tag in ["timeout", "database"] {
        if description.contains(tag) && entry.has_tag(tag) {
            terms.push(tag.to_string());
        }
    }

    if let Some(code) = report.error_code.as_deref().filter(|c| !c.is_empty()) {
        if entry.title.to_lowercase().contains(&code.to_lowercase()) {
            terms.push(code.to_string());
        }
    }

    terms
}
