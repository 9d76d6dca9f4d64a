//! The mock corpus: canned documents standing in for real search backends.
//!
//! Entries are grouped by source and listed in the order searches return
//! them. Nothing mutates the corpus; searches clone entries into
//! [`SearchResult`](crate::models::SearchResult)s.

use crate::models::Source;

/// A canned document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusEntry {
    pub title: &'static str,
    pub snippet: &'static str,
    pub relevance: f64,
    pub url: &'static str,
    pub tags: &'static [&'static str],
}

impl CorpusEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }
}

const CONFLUENCE: &[CorpusEntry] = &[
    CorpusEntry {
        title: "Database Connection Timeout Troubleshooting Guide",
        snippet: "Common causes and solutions for database timeout issues. Check connection pool settings, network latency, and database performance metrics.",
        relevance: 0.95,
        url: "https://confluence.company.com/db-timeout-guide",
        tags: &["database", "timeout", "performance"],
    },
    CorpusEntry {
        title: "Production Database Configuration Best Practices",
        snippet: "Optimal configuration settings for production databases including connection pooling, timeout values, and monitoring setup.",
        relevance: 0.87,
        url: "https://confluence.company.com/db-config",
        tags: &["database", "configuration", "production"],
    },
    CorpusEntry {
        title: "Application Performance Monitoring Setup",
        snippet: "How to set up comprehensive monitoring for application performance issues including database connections and response times.",
        relevance: 0.82,
        url: "https://confluence.company.com/apm-setup",
        tags: &["monitoring", "performance", "apm"],
    },
];

const TEAMS: &[CorpusEntry] = &[
    CorpusEntry {
        title: "Database timeout issue - RESOLVED",
        snippet: "We had similar timeout issues last month. Fixed by increasing connection pool size from 10 to 25 and optimizing slow queries. Also added connection retry logic.",
        relevance: 0.92,
        url: "https://teams.microsoft.com/channel/db-team",
        tags: &["timeout", "resolved", "connection-pool"],
    },
    CorpusEntry {
        title: "Production incident post-mortem",
        snippet: "Analysis of the timeout issues we experienced during high load. Root cause was insufficient connection pooling and database lock contention.",
        relevance: 0.88,
        url: "https://teams.microsoft.com/channel/incidents",
        tags: &["incident", "postmortem", "database"],
    },
];

const OUTLOOK: &[CorpusEntry] = &[
    CorpusEntry {
        title: "RE: Urgent - Database Performance Issues",
        snippet: "The DBA team implemented connection pooling improvements and optimized the most problematic queries. Performance improved by 40%.",
        relevance: 0.78,
        url: "mailto:dba-team@company.com",
        tags: &["database", "performance", "dba"],
    },
    CorpusEntry {
        title: "Weekly Infrastructure Report",
        snippet: "Database connection metrics showing improved stability after recent configuration changes. Timeout incidents reduced by 85%.",
        relevance: 0.75,
        url: "mailto:infrastructure@company.com",
        tags: &["infrastructure", "metrics", "database"],
    },
];

const LOCAL: &[CorpusEntry] = &[
    CorpusEntry {
        title: "db_troubleshooting_runbook.pdf",
        snippet: "Step-by-step database troubleshooting procedures including connection timeout diagnosis and resolution steps.",
        relevance: 0.85,
        url: "/docs/db_troubleshooting_runbook.pdf",
        tags: &["runbook", "database", "troubleshooting"],
    },
    CorpusEntry {
        title: "production_incident_logs.txt",
        snippet: "Detailed logs from recent production incidents showing connection timeout patterns and resolution steps taken.",
        relevance: 0.80,
        url: "/logs/production_incident_logs.txt",
        tags: &["logs", "incident", "production"],
    },
];

/// Corpus entries for a known source.
pub fn entries(source: Source) -> &'static [CorpusEntry] {
    match source {
        Source::Confluence => CONFLUENCE,
        Source::Teams => TEAMS,
        Source::Outlook => OUTLOOK,
        Source::Local => LOCAL,
    }
}

/// Corpus entries by source id. Unknown ids have no entries.
pub fn lookup(source_id: &str) -> &'static [CorpusEntry] {
    source_id
        .parse::<Source>()
        .map(entries)
        .unwrap_or(&[])
}

/// Total number of documents across all sources.
pub fn total_entries() -> usize {
    Source::ALL.iter().map(|s| entries(*s).len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_shape() {
        assert_eq!(entries(Source::Confluence).len(), 3);
        assert_eq!(entries(Source::Teams).len(), 2);
        assert_eq!(entries(Source::Outlook).len(), 2);
        assert_eq!(entries(Source::Local).len(), 2);
        assert_eq!(total_entries(), 9);
    }

    #[test]
    fn unknown_source_is_empty() {
        assert!(lookup("jira").is_empty());
        assert_eq!(lookup("teams").len(), 2);
    }

    #[test]
    fn relevances_in_unit_interval() {
        for source in Source::ALL {
            for entry in entries(source) {
                assert!((0.0..=1.0).contains(&entry.relevance), "{}", entry.title);
            }
        }
    }
}
