// src/pipeline/report.rs

//! PDF report rendering.
//!
//! Rendering happens in two stages: [`layout`] places every text line on A4
//! pages (top-left origin, millimetres), then [`render_pdf`] draws those
//! lines with the built-in Helvetica faces.
//!
//! Page model: 10 mm margins, automatic break 20 mm above the bottom edge.
//! The title is a centred 14 pt row of 10 mm. Each entry is a bold 12 pt
//! heading row of 10 mm, the URL in 10 pt rows of 5 mm, then a 2 mm gap.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::DiscoveryEntry;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const BREAK_MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

const TITLE_SIZE_PT: f32 = 14.0;
const HEADING_SIZE_PT: f32 = 12.0;
const URL_SIZE_PT: f32 = 10.0;
const TITLE_ROW_MM: f32 = 10.0;
const HEADING_ROW_MM: f32 = 10.0;
const URL_ROW_MM: f32 = 5.0;
const ENTRY_GAP_MM: f32 = 2.0;

/// Prefix of every report file name.
pub const REPORT_PREFIX: &str = "booksy_report_";

/// Font face of a laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size_pt: f32,
    pub style: FontStyle,
    /// Left edge, from the left page border
    pub x_mm: f32,
    /// Baseline, from the top page border
    pub baseline_mm: f32,
}

/// Lines of a single page.
pub type Page = Vec<TextLine>;

/// Report file name for the given local time, to minute granularity.
pub fn report_file_name(at: NaiveDateTime) -> String {
    format!("{}{}.pdf", REPORT_PREFIX, at.format("%Y%m%d_%H%M"))
}

/// Approximate rendered width of `text` in millimetres.
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.graphemes(true).count() as f32 * size_pt * PT_TO_MM * AVG_GLYPH_EM
}

/// Maximum characters fitting between the margins at a font size.
fn max_chars(size_pt: f32) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable / (size_pt * PT_TO_MM * AVG_GLYPH_EM)).floor() as usize).max(1)
}

/// Hard-wrap text into chunks of at most `width` graphemes.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.is_empty() {
        return vec![String::new()];
    }
    graphemes
        .chunks(width.max(1))
        .map(|chunk| chunk.concat())
        .collect()
}

/// Cursor that flows rows down the page and breaks pages automatically.
struct Flow {
    pages: Vec<Page>,
    y: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: MARGIN_MM,
        }
    }

    fn current(&mut self) -> &mut Page {
        // `pages` is created non-empty and only ever grows.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn break_if_needed(&mut self, height: f32) {
        let limit = PAGE_HEIGHT_MM - BREAK_MARGIN_MM;
        if self.y + height > limit && !self.current().is_empty() {
            self.pages.push(Vec::new());
            self.y = MARGIN_MM;
        }
    }

    fn row(&mut self, text: String, size_pt: f32, style: FontStyle, height: f32, centred: bool) {
        self.break_if_needed(height);

        let x_mm = if centred {
            ((PAGE_WIDTH_MM - text_width_mm(&text, size_pt)) / 2.0).max(MARGIN_MM)
        } else {
            MARGIN_MM
        };
        let baseline_mm = self.y + height / 2.0 + 0.3 * size_pt * PT_TO_MM;

        self.current().push(TextLine {
            text,
            size_pt,
            style,
            x_mm,
            baseline_mm,
        });
        self.y += height;
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }
}

/// Place the title and every entry on pages.
pub fn layout(title: &str, entries: &[DiscoveryEntry]) -> Vec<Page> {
    let mut flow = Flow::new();
    flow.row(
        title.to_string(),
        TITLE_SIZE_PT,
        FontStyle::Regular,
        TITLE_ROW_MM,
        true,
    );

    let url_width = max_chars(URL_SIZE_PT);
    for entry in entries {
        flow.row(
            entry.heading(),
            HEADING_SIZE_PT,
            FontStyle::Bold,
            HEADING_ROW_MM,
            false,
        );
        for chunk in wrap_text(&entry.url, url_width) {
            flow.row(chunk, URL_SIZE_PT, FontStyle::Regular, URL_ROW_MM, false);
        }
        flow.gap(ENTRY_GAP_MM);
    }

    flow.pages
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::render(format!("{e:?}"))
}

/// Render the report into PDF bytes.
pub fn render_pdf(title: &str, entries: &[DiscoveryEntry]) -> Result<Vec<u8>> {
    let pages = layout(title, entries);

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (index, lines) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        for line in lines {
            let font: &IndirectFontRef = match line.style {
                FontStyle::Regular => &regular,
                FontStyle::Bold => &bold,
            };
            layer.use_text(
                line.text.as_str(),
                line.size_pt,
                Mm(line.x_mm),
                Mm(PAGE_HEIGHT_MM - line.baseline_mm),
                font,
            );
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Turns discovery entries into a report file.
pub trait ReportRenderer: Send + Sync {
    /// Write the report and return its path. Only called with entries.
    fn render(&self, entries: &[DiscoveryEntry]) -> Result<PathBuf>;
}

/// Writes timestamped PDF reports into a directory.
pub struct PdfReportRenderer {
    output_dir: PathBuf,
    title: String,
}

impl PdfReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            title: title.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(&self, entries: &[DiscoveryEntry]) -> Result<PathBuf> {
        let bytes = render_pdf(&self.title, entries)?;

        let path = self
            .output_dir
            .join(report_file_name(Local::now().naive_local()));
        std::fs::create_dir_all(&self.output_dir)
            .and_then(|_| std::fs::write(&path, &bytes))
            .map_err(|e| AppError::render(format!("cannot write {}: {}", path.display(), e)))?;

        log::info!(
            "Report with {} entries written to {}",
            entries.len(),
            path.display()
        );
        Ok(path)
    }
}
