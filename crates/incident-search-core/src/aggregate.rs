//! Result aggregation and ranking.
//!
//! Flattens per-source results in source order, tags each with its source,
//! and sorts by relevance descending. The sort is stable: equal scores keep
//! source order (confluence, teams, outlook, local) and corpus order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{RankedResult, SearchResult, Source};

/// Number of top recommendations surfaced per search.
pub const TOP_RECOMMENDATIONS: usize = 3;

/// All results, source-tagged, sorted by relevance descending.
pub fn rank_all(results: &BTreeMap<Source, Vec<SearchResult>>) -> Vec<RankedResult> {
    let mut all: Vec<RankedResult> = results
        .iter()
        .flat_map(|(source, list)| {
            list.iter().map(move |result| RankedResult {
                source: *source,
                result: result.clone(),
            })
        })
        .collect();

    all.sort_by(|a, b| {
        b.result
            .relevance
            .partial_cmp(&a.result.relevance)
            .unwrap_or(Ordering::Equal)
    });

    all
}

/// Top recommendations and the full ranked list in one pass.
pub fn aggregate(results: &BTreeMap<Source, Vec<SearchResult>>) -> (Vec<RankedResult>, Vec<RankedResult>) {
    let all = rank_all(results);
    let top = all.iter().take(TOP_RECOMMENDATIONS).cloned().collect();
    (top, all)
}
