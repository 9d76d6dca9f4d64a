//! Rule-based query expansion.
//!
//! Stands in for an LLM: the expanded query and keyword list are derived
//! from the [`ErrorReport`] with fixed lookup tables, so the same report
//! always expands the same way.
//!
//! # Expanded query
//!
//! Terms are appended in this order and joined with `" | "`:
//!
//! 1. error code, application name, lower-cased environment (when present)
//! 2. the severity's synonym group
//! 3. one synonym group per description trigger (`timeout`, `database`,
//!    `null`, `authentication`), matched case-insensitively as substrings

use crate::models::{ErrorReport, ExpandedQuery, Severity};

/// Separator between expanded terms.
pub const TERM_SEPARATOR: &str = " | ";

/// Description substrings that become keywords when present.
pub const TRIGGER_WORDS: [&str; 10] = [
    "timeout",
    "connection",
    "database",
    "error",
    "exception",
    "null",
    "authentication",
    "performance",
    "response",
    "query",
];

/// Synonyms appended for a severity.
pub fn severity_terms(severity: Severity) -> &'static [&'static str] {
    match severity {
        Severity::P1 => &["critical", "urgent", "production down", "outage"],
        Severity::P2 => &["high priority", "performance issue", "degraded service"],
        Severity::P3 => &["medium priority", "minor issue", "enhancement"],
    }
}

/// Description triggers and the synonym group each one adds.
pub const DESCRIPTION_RULES: [(&str, [&str; 4]); 4] = [
    (
        "timeout",
        [
            "connection timeout",
            "network timeout",
            "database timeout",
            "response timeout",
        ],
    ),
    (
        "database",
        ["db connection", "sql", "query performance", "connection pool"],
    ),
    (
        "null",
        ["null pointer", "NPE", "object reference", "initialization"],
    ),
    (
        "authentication",
        ["auth", "login", "security", "user session"],
    ),
];

/// Expand a report into the original query, expanded query, and keywords.
pub fn expand(report: &ErrorReport) -> ExpandedQuery {
    ExpandedQuery {
        original_query: original_query(report),
        expanded_query: expanded_terms(report).join(TERM_SEPARATOR),
        keywords: extract_keywords(report),
    }
}

/// Non-empty fields of severity, code, description, app, and environment, space-joined.
pub fn original_query(report: &ErrorReport) -> String {
    let severity = report.severity.to_string();
    let environment = report.environment.to_string();
    let fields = [
        Some(severity.as_str()),
        report.error_code.as_deref(),
        Some(report.description.as_str()),
        report.app_name.as_deref(),
        Some(environment.as_str()),
    ];

    fields
        .iter()
        .flatten()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered expansion terms before joining.
pub fn expanded_terms(report: &ErrorReport) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    if let Some(code) = &report.error_code {
        terms.push(code.clone());
    }
    if let Some(app) = &report.app_name {
        terms.push(app.clone());
    }
    terms.push(report.environment.term());

    terms.extend(severity_terms(report.severity).iter().map(|t| t.to_string()));

    let description = report.description.to_lowercase();
    for (trigger, synonyms) in DESCRIPTION_RULES {
        if description.contains(trigger) {
            terms.extend(synonyms.iter().map(|t| t.to_string()));
        }
    }

    terms
}

/// Deduplicated keywords in first-seen order.
pub fn extract_keywords(report: &ErrorReport) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut add = |kw: String| {
        if !keywords.contains(&kw) {
            keywords.push(kw);
        }
    };

    if let Some(code) = &report.error_code {
        add(code.clone());
    }
    if let Some(app) = &report.app_name {
        add(app.clone());
    }
    add(report.environment.term());
    add(report.severity.to_string());

    let description = report.description.to_lowercase();
    for word in TRIGGER_WORDS {
        if description.contains(word) {
            add(word.to_string());
        }
    }

    keywords
}
