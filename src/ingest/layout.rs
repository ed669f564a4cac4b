//! Positional page layout for table detection.
//!
//! Plain text extraction collapses horizontal gaps to a single space, so
//! column boundaries are lost. Here every glyph is recorded with its page
//! position, glyphs are grouped into rows by baseline and into cells by
//! horizontal gaps, and each page is rendered as tab-separated rows.

use std::path::Path;

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use crate::error::{DocmineError, Result};
use crate::ingest::pdf::PageSource;

/// Horizontal gap, in font sizes, that separates two cells.
const CELL_GAP_EMS: f64 = 1.5;
/// Gap, in font sizes, rendered as a space inside a cell.
const WORD_GAP_EMS: f64 = 0.1;
/// Baseline tolerance, in font sizes, for glyphs on the same row.
const ROW_TOLERANCE_EMS: f64 = 0.5;

/// One glyph in top-down page coordinates.
#[derive(Debug, Clone)]
struct Glyph {
    x: f64,
    y: f64,
    end: f64,
    size: f64,
    text: String,
}

/// Collects positioned glyphs, page by page.
#[derive(Default)]
struct GlyphCollector {
    pages: Vec<Vec<Glyph>>,
    current: Vec<Glyph>,
    page_height: f64,
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.current.clear();
        self.page_height = media_box.ury - media_box.lly;
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.pages.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let sx = font_size * (trm.m11 + trm.m21);
        let sy = font_size * (trm.m12 + trm.m22);
        let size = (sx * sy).abs().sqrt();
        let x = trm.m31;
        self.current.push(Glyph {
            x,
            y: self.page_height - trm.m32,
            end: x + width * size,
            size,
            text: char.to_string(),
        });
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Group glyphs into rows, top to bottom, each sorted left to right.
fn group_rows(mut glyphs: Vec<Glyph>) -> Vec<Vec<Glyph>> {
    glyphs.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    let mut rows: Vec<Vec<Glyph>> = Vec::new();
    for glyph in glyphs {
        let same_row = rows.last().and_then(|row| row.first()).is_some_and(|first| {
            (glyph.y - first.y).abs() <= first.size.max(glyph.size) * ROW_TOLERANCE_EMS
        });
        match rows.last_mut() {
            Some(row) if same_row => row.push(glyph),
            _ => rows.push(vec![glyph]),
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

/// Split a row into cells on wide horizontal gaps.
fn split_cells(row: &[Glyph]) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut last_end: Option<f64> = None;

    for glyph in row {
        if let Some(end) = last_end {
            let gap = glyph.x - end;
            if gap > glyph.size * CELL_GAP_EMS {
                cells.push(std::mem::take(&mut cell));
            } else if gap > glyph.size * WORD_GAP_EMS && !cell.ends_with(' ') {
                cell.push(' ');
            }
        }
        if glyph.text.trim().is_empty() {
            if !cell.is_empty() && !cell.ends_with(' ') {
                cell.push(' ');
            }
        } else {
            cell.push_str(&glyph.text);
        }
        last_end = Some(glyph.end.max(last_end.unwrap_or(f64::MIN)));
    }
    cells.push(cell);

    cells
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Render glyphs as tab-separated cells and newline-separated rows.
fn render_page(glyphs: Vec<Glyph>) -> String {
    group_rows(glyphs)
        .iter()
        .map(|row| split_cells(row).join("\t"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A PDF rendered page by page as column-aligned rows.
pub struct PdfLayout {
    path: String,
    pages: Vec<String>,
}

impl PdfLayout {
    /// Read a PDF and lay out the glyphs of every page.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let pdf_err = |detail: String| DocmineError::Pdf {
            path: path.to_string_lossy().into(),
            detail,
        };

        let mut doc = pdf_extract::Document::load_mem(&bytes)
            .map_err(|e| pdf_err(format!("PDF load error: {e}")))?;
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| pdf_err(format!("PDF decryption error: {e}")))?;
        }

        let mut collector = GlyphCollector::default();
        pdf_extract::output_doc(&doc, &mut collector)
            .map_err(|e| pdf_err(format!("PDF layout error: {e}")))?;

        tracing::debug!(path = %path.display(), pages = collector.pages.len(), "laid out PDF");
        Ok(Self {
            path: path.to_string_lossy().into(),
            pages: collector.pages.into_iter().map(render_page).collect(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PageSource for PdfLayout {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.pages.get(index).cloned().ok_or_else(|| DocmineError::Pdf {
            path: self.path.clone(),
            detail: format!("page {} out of range", index + 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Glyphs for `text` starting at `x` on baseline `y`, 12pt, 6pt advance.
    fn word(text: &str, x: f64, y: f64) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let gx = x + 6.0 * i as f64;
                Glyph {
                    x: gx,
                    y,
                    end: gx + 6.0,
                    size: 12.0,
                    text: c.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn wide_gaps_become_cells() {
        let mut glyphs = word("Item", 100.0, 92.0);
        glyphs.extend(word("Price", 300.0, 92.0));
        glyphs.extend(word("Widget", 100.0, 112.0));
        glyphs.extend(word("1.00", 300.0, 112.5));
        assert_eq!(render_page(glyphs), "Item\tPrice\nWidget\t1.00");
    }

    #[test]
    fn rows_follow_page_order_not_emit_order() {
        let mut glyphs = word("second", 100.0, 200.0);
        glyphs.extend(word("first", 100.0, 100.0));
        assert_eq!(render_page(glyphs), "first\nsecond");
    }

    #[test]
    fn small_gaps_and_spaces_stay_in_one_cell() {
        let mut glyphs = word("Hello", 100.0, 50.0);
        glyphs.extend(word(" ", 130.0, 50.0));
        glyphs.extend(word("big", 136.0, 50.0));
        glyphs.extend(word("world", 158.0, 50.0));
        assert_eq!(render_page(glyphs), "Hello big world");
    }

    #[test]
    fn empty_page_renders_empty() {
        assert_eq!(render_page(Vec::new()), "");
    }

    #[test]
    fn fixture_pages_render_as_rows_of_cells() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/pdf/twelve_page_tables.pdf");
        let layout = PdfLayout::open(&path).unwrap();
        assert_eq!(layout.page_count(), 12);
        assert_eq!(
            layout.page_text(0).unwrap(),
            "Price list 1\nItem\tPrice\nWidget\t1.00"
        );
        assert!(layout.page_text(12).is_err());
    }

    #[test]
    fn open_garbage_is_a_pdf_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"not a pdf at all").unwrap();
        let err = PdfLayout::open(tmp.path()).err().unwrap();
        assert!(matches!(err, DocmineError::Pdf { .. }));
    }
}
