//! Plain-text rendering of search sections for the terminal.
//!
//! Every function returns a `String` so presenters decide where it goes.

use incident_search_core::graph::WorkflowGraph;
use incident_search_core::history::SearchHistory;
use incident_search_core::models::{CurrentSearch, ExpandedQuery, RankedResult, SearchResult};

/// Query expansion section.
pub fn expansion(q: &ExpandedQuery) -> String {
    let mut out = String::new();
    out.push_str("Query Expansion\n");
    out.push_str("===============\n");
    out.push_str(&format!("  Original:  {}\n", q.original_query));
    out.push_str(&format!("  Expanded:  {}\n", q.expanded_query));
    out.push_str(&format!("  Keywords:  {}\n", q.keywords.join(", ")));
    out
}

/// Node and edge listing for the workflow diagram, with each node's hover text.
pub fn graph(g: &WorkflowGraph) -> String {
    let mut out = String::from("workflow\n");
    for node in &g.nodes {
        let targets: Vec<&str> = g
            .edges
            .iter()
            .filter(|e| e.source == node.id)
            .map(|e| e.target)
            .collect();
        if targets.is_empty() {
            out.push_str(&format!("  [{}]\n", node.name));
        } else {
            out.push_str(&format!("  [{}] -> {}\n", node.name, targets.join(", ")));
        }
        if let Some(tip) = g.tooltip(node.id) {
            out.push_str(&format!("      {}\n", tip));
        }
    }
    out
}

/// `"1 result"` / `"3 results"`.
pub fn result_count(n: usize) -> String {
    if n == 1 {
        "1 result".to_string()
    } else {
        format!("{} results", n)
    }
}

fn recommendation_card(rank: usize, rec: &RankedResult) -> String {
    let r = &rec.result;
    format!(
        "  {}. {}  [{}]  {}% match\n     {}\n     tags: {}\n     {}\n",
        rank,
        r.title,
        rec.source.label(),
        r.percent(),
        r.snippet,
        r.tags.join(", "),
        r.url
    )
}

fn result_item(r: &SearchResult) -> String {
    let mut out = format!("    - {} ({}%)\n      {}\n", r.title, r.percent(), r.snippet);
    if !r.tags.is_empty() {
        out.push_str(&format!("      tags: {}\n", r.tags.join(", ")));
    }
    if !r.search_terms_matched.is_empty() {
        out.push_str(&format!(
            "      matched: {}\n",
            r.search_terms_matched.join(", ")
        ));
    }
    out
}

/// Results section: count, top recommendations, then results by source.
pub fn results(search: &CurrentSearch) -> String {
    let mut out = String::new();
    // Header count is never singularized, unlike the per-source counts.
    out.push_str(&format!("{} results found\n\n", search.result_count()));

    out.push_str("Top Recommendations\n");
    out.push_str("===================\n");
    for (i, rec) in search.top_recommendations.iter().enumerate() {
        out.push_str(&recommendation_card(i + 1, rec));
    }

    for (source, list) in &search.results {
        if list.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!(
            "{} {} Search  ({})\n",
            source.glyph(),
            source.label(),
            result_count(list.len())
        ));
        for r in list {
            out.push_str(&result_item(r));
        }
    }
    out
}

/// Saved searches, newest first.
pub fn history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "No previous searches\n".to_string();
    }
    let mut out = String::new();
    for entry in history.entries() {
        out.push_str(&format!(
            "{}  {}\n  {}\n  {}\n",
            entry.id,
            entry.headline(),
            entry.local_date(),
            entry.query_preview()
        ));
    }
    out
}
