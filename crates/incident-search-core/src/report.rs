//! Report layout: positioned text blocks, wrapped and paginated.
//!
//! Produces a renderer-neutral [`ReportLayout`] from a completed search.
//! Coordinates are millimetres from the top-left of an A4 page; font sizes
//! are points. Renderers (PDF, plain text) live in the application crate.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::CurrentSearch;

/// A4 width in millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 height in millimetres.
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Cursor position past which the next block starts a new page.
pub const PAGE_BREAK_MM: f64 = 250.0;
/// Cursor position at the top of a continuation page.
pub const PAGE_TOP_MM: f64 = 30.0;

const MM_PER_PT: f64 = 25.4 / 72.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f64 = 0.5;

pub const REPORT_TITLE: &str = "Error Resolution Search Report";

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportPage {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLayout {
    pub pages: Vec<ReportPage>,
    /// File name without extension, e.g. `error-resolution-report-1700000000000`.
    pub file_stem: String,
}

impl ReportLayout {
    /// All text in page order, one string per line.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }
}

/// Greedy word wrap to a width in millimetres at a given font size.
///
/// Words longer than a full line are split.
pub fn wrap_text(text: &str, width_mm: f64, font_size: f64) -> Vec<String> {
    let glyph_mm = font_size * MM_PER_PT * AVG_GLYPH_EM;
    let max_chars = ((width_mm / glyph_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Lowest baseline a line may sit on before it spills to the next page.
const PAGE_BOTTOM_MM: f64 = PAGE_HEIGHT_MM - 15.0;

struct LayoutCursor {
    pages: Vec<ReportPage>,
    y: f64,
}

impl LayoutCursor {
    fn new() -> Self {
        Self {
            pages: vec![ReportPage::default()],
            y: 0.0,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(ReportPage::default());
        self.y = PAGE_TOP_MM;
    }

    /// Place one line at the cursor, then advance by `advance` millimetres.
    fn put(&mut self, x: f64, font_size: f64, text: impl Into<String>, advance: f64) {
        if self.y > PAGE_BOTTOM_MM {
            self.new_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(TextLine {
                x,
                y: self.y,
                font_size,
                text: text.into(),
            });
        }
        self.y += advance;
    }

    fn put_lines(&mut self, x: f64, font_size: f64, lines: &[String], spacing: f64) {
        for line in lines {
            self.put(x, font_size, line.clone(), spacing);
        }
    }

    fn skip(&mut self, mm: f64) {
        self.y += mm;
    }

    fn break_if_past(&mut self, limit: f64) {
        if self.y > limit {
            self.new_page();
        }
    }
}

/// Lay out the report for a completed search.
pub fn layout(search: &CurrentSearch, generated_at: DateTime<Local>) -> ReportLayout {
    let mut c = LayoutCursor::new();

    c.y = 30.0;
    c.put(20.0, 20.0, REPORT_TITLE, 10.0);
    c.put(
        20.0,
        10.0,
        format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        20.0,
    );

    c.put(20.0, 14.0, "Original Query:", 10.0);
    c.put_lines(20.0, 10.0, &wrap_text(search.original_query(), 170.0, 10.0), 5.0);
    c.skip(10.0);

    c.put(20.0, 14.0, "Expanded Search Terms:", 10.0);
    c.put_lines(20.0, 10.0, &wrap_text(search.expanded_query(), 170.0, 10.0), 5.0);
    c.skip(20.0);

    c.put(20.0, 16.0, "Top 3 Recommendations:", 10.0);

    for (i, rec) in search.top_recommendations.iter().enumerate() {
        c.put(25.0, 12.0, format!("{}. {}", i + 1, rec.result.title), 7.0);
        c.put(
            30.0,
            10.0,
            format!(
                "Source: {} | Relevance: {}%",
                rec.source.label(),
                rec.result.percent()
            ),
            5.0,
        );
        c.put_lines(30.0, 10.0, &wrap_text(&rec.result.snippet, 160.0, 10.0), 4.0);
        c.skip(10.0);

        c.break_if_past(PAGE_BREAK_MM);
    }

    ReportLayout {
        pages: c.pages,
        file_stem: format!(
            "error-resolution-report-{}",
            generated_at.timestamp_millis()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Environment, ErrorReport, ExpandedQuery, RankedResult, SearchResult, Severity, Source,
    };
    use chrono::{TimeZone, Utc};

    fn search_with(recs: usize, snippet: &str) -> CurrentSearch {
        let report = ErrorReport {
            severity: Severity::P1,
            error_code: None,
            description: "boom".to_string(),
            app_name: None,
            environment: Environment::Prod,
            applicable_pool: None,
            timestamp: Utc::now(),
        };
        let expansion = ExpandedQuery {
            original_query: "P1 boom Prod".to_string(),
            expanded_query: "prod | critical | urgent | production down | outage".to_string(),
            keywords: vec![],
        };
        let mut search = CurrentSearch::new(report, expansion);
        search.top_recommendations = (0..recs)
            .map(|i| RankedResult {
                source: Source::Teams,
                result: SearchResult {
                    title: format!("Doc {}", i),
                    snippet: snippet.to_string(),
                    relevance: 0.918,
                    url: String::new(),
                    tags: vec![],
                    search_terms_matched: vec![],
                },
            })
            .collect();
        search
    }

    fn at() -> DateTime<Local> {
        Local.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn wrap_respects_width() {
        let text = "alpha beta gamma delta ".repeat(30);
        let lines = wrap_text(&text, 170.0, 10.0);
        assert!(lines.len() > 1);
        let max_chars = (170.0 / (10.0 * MM_PER_PT * AVG_GLYPH_EM)).floor() as usize;
        for line in &lines {
            assert!(line.chars().count() <= max_chars, "{}", line);
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn wrap_splits_long_words() {
        let word = "x".repeat(250);
        let lines = wrap_text(&word, 170.0, 10.0);
        assert!(lines.len() >= 3);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_empty() {
        assert!(wrap_text("   ", 170.0, 10.0).is_empty());
    }

    #[test]
    fn header_and_sections_present() {
        let layout = layout(&search_with(3, "short snippet"), at());
        let texts: Vec<&str> = layout.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts[0], REPORT_TITLE);
        assert!(texts[1].starts_with("Generated on: "));
        assert!(texts.contains(&"Original Query:"));
        assert!(texts.contains(&"P1 boom Prod"));
        assert!(texts.contains(&"Expanded Search Terms:"));
        assert!(texts.contains(&"Top 3 Recommendations:"));
        assert!(texts.contains(&"1. Doc 0"));
        assert!(texts.contains(&"Source: Teams | Relevance: 92%"));
        assert_eq!(layout.file_stem, "error-resolution-report-1700000000000");
        assert_eq!(layout.pages.len(), 1);
    }

    #[test]
    fn long_recommendations_paginate() {
        let snippet = "lorem ipsum dolor sit amet ".repeat(60);
        let layout = layout(&search_with(3, &snippet), at());
        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            for line in &page.lines {
                assert!(line.y <= PAGE_BOTTOM_MM + 5.0, "{} off page", line.y);
            }
        }
        for page in &layout.pages[1..] {
            if let Some(first) = page.lines.first() {
                assert!(first.y >= PAGE_TOP_MM);
            }
        }
    }
}
