//! Report export.
//!
//! The layout (wrapping, pagination, file name) is computed in core by
//! [`report::layout`]. This module turns a [`ReportLayout`] into bytes and
//! writes it to the configured output directory.
//!
//! | Format | Renderer | Extension |
//! |--------|----------|-----------|
//! | `pdf` | [`PdfRenderer`] (lopdf, Helvetica, A4) | `.pdf` |
//! | `text` | [`TextRenderer`] (pages split by form feed) | `.txt` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use incident_search_core::models::CurrentSearch;
use incident_search_core::report::{self, ReportLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Turns a laid-out report into file bytes.
pub trait ReportRenderer: Send + Sync {
    fn extension(&self) -> &'static str;
    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>>;
}

/// Renderer for a `report.format` value.
pub fn renderer_for(format: &str) -> Result<Box<dyn ReportRenderer>> {
    match format {
        "pdf" => Ok(Box::new(PdfRenderer)),
        "text" => Ok(Box::new(TextRenderer)),
        other => anyhow::bail!("Unknown report format: '{}'. Must be pdf or text.", other),
    }
}

/// A4 PDF with one Helvetica text object per line.
pub struct PdfRenderer;

/// Encode text for a WinAnsi font. Characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

impl ReportRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>> {
        let page_w = (PAGE_WIDTH_MM * PT_PER_MM) as f32;
        let page_h = (PAGE_HEIGHT_MM * PT_PER_MM) as f32;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
        for page in &layout.pages {
            let mut operations = Vec::with_capacity(page.lines.len() * 5);
            for line in &page.lines {
                let x = (line.x * PT_PER_MM) as f32;
                let y = page_h - (line.y * PT_PER_MM) as f32;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec!["F1".into(), Object::Real(line.font_size as f32)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(x), Object::Real(y)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(win_ansi(&line.text))],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let encoded = content.encode().context("Failed to encode page content")?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).context("Failed to write PDF")?;
        Ok(bytes)
    }
}

/// Plain text, one report line per output line.
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>> {
        let mut out = String::new();
        for (i, page) in layout.pages.iter().enumerate() {
            if i > 0 {
                out.push('\u{c}');
                out.push('\n');
            }
            for line in &page.lines {
                let indent = ((line.x - 20.0) / 5.0).max(0.0) as usize * 2;
                out.push_str(&" ".repeat(indent));
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        Ok(out.into_bytes())
    }
}

/// Lay out, render, and write the report. Returns the written path.
pub fn export_report(
    search: &CurrentSearch,
    renderer: &dyn ReportRenderer,
    dir: &Path,
    generated_at: DateTime<Local>,
) -> Result<PathBuf> {
    let layout = report::layout(search, generated_at);
    let bytes = renderer.render(&layout)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
    let path = dir.join(format!("{}.{}", layout.file_stem, renderer.extension()));
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "report exported"
    );
    Ok(path)
}
