//! PDF text and table extraction into the store.

use std::path::Path;

use serde::Serialize;

use crate::config::ExtractionSettings;
use crate::db::Database;
use crate::error::Result;
use crate::ingest::chunker::{chunk_text, determine_chunk_size};
use crate::ingest::normalize::clean_page_text;
use crate::ingest::layout::PdfLayout;
use crate::ingest::pdf::{page_batches, PageSource, PdfDocument};
use crate::ingest::tables::{table_batches, write_side_files, TableDetector};

/// Result of extracting the text of one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub file_name: String,
    pub pages: usize,
    pub batches: usize,
    pub chunks: usize,
    /// Maximum characters per chunk, derived from the file size.
    pub chunk_size: usize,
}

/// Result of extracting the tables of one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableSummary {
    pub file_name: String,
    pub batches: usize,
    pub tables: usize,
    /// Side files written, if enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side_files: Vec<String>,
}

/// Extract the text of a PDF page by page and store it as chunks under its path.
pub fn extract_pdf_content_and_store(
    db: &mut Database,
    settings: &ExtractionSettings,
    path: &Path,
) -> Result<ExtractionSummary> {
    let size = std::fs::metadata(path)?.len();
    let doc = PdfDocument::open(path)?;
    tracing::info!(
        "extracting {} ({} pages, {size} bytes)",
        doc.path(),
        doc.page_count()
    );
    store_pages(db, settings, doc.path(), &doc, determine_chunk_size(size))
}

/// Store the pages of `source` as chunks of `file_name`.
///
/// Every page is cleaned and chunked on its own, so a page never shares a
/// chunk with its neighbours. Pages that are empty after cleaning store
/// nothing. Each page batch is written in one transaction.
pub fn store_pages<S: PageSource + ?Sized>(
    db: &mut Database,
    settings: &ExtractionSettings,
    file_name: &str,
    source: &S,
    chunk_size: usize,
) -> Result<ExtractionSummary> {
    let mut summary = ExtractionSummary {
        file_name: file_name.to_string(),
        chunk_size,
        ..Default::default()
    };

    for batch in page_batches(source, settings.page_batch_size) {
        let batch = batch?;
        let chunks: Vec<String> = batch
            .pages
            .iter()
            .map(|page| clean_page_text(page, settings.stitch_fragments, settings.dedupe_chars))
            .filter(|text| !text.trim().is_empty())
            .flat_map(|text| chunk_text(&text, chunk_size))
            .collect();
        tracing::debug!(
            "pages {}-{} of {file_name}: {} chunks",
            batch.first_page,
            batch.last_page(),
            chunks.len()
        );
        summary.chunks += db.store_file_with_chunks(file_name, &chunks)?;
        summary.pages += batch.pages.len();
        summary.batches += 1;
    }

    tracing::info!(
        "stored {} chunks from {} pages of {file_name}",
        summary.chunks,
        summary.pages
    );
    Ok(summary)
}

/// Detect the tables of a PDF and store them under its path.
///
/// Cells are found from glyph positions, not from the plain text. When `side_file_dir` is set, every table is also written there as a TSV file.
pub fn extract_pdf_tables_and_store(
    db: &mut Database,
    settings: &ExtractionSettings,
    side_file_dir: Option<&Path>,
    path: &Path,
) -> Result<TableSummary> {
    let doc = PdfLayout::open(path)?;
    tracing::info!("extracting tables from {} ({} pages)", doc.path(), doc.page_count());
    store_page_tables(db, settings, side_file_dir, doc.path(), &doc)
}

/// Store the tables found in `source` as tables of `file_name`, one batch at a time.
pub fn store_page_tables<S: PageSource + ?Sized>(
    db: &mut Database,
    settings: &ExtractionSettings,
    side_file_dir: Option<&Path>,
    file_name: &str,
    source: &S,
) -> Result<TableSummary> {
    let detector = TableDetector::new()?;
    let mut summary = TableSummary {
        file_name: file_name.to_string(),
        ..Default::default()
    };

    for batch in table_batches(source, settings.page_batch_size, &detector) {
        let batch = batch?;
        tracing::debug!(
            "table batch {} (pages {}-{}): {} tables",
            batch.index,
            batch.first_page,
            batch.last_page,
            batch.tables.len()
        );
        if let Some(dir) = side_file_dir {
            for path in write_side_files(dir, &batch)? {
                summary.side_files.push(path.to_string_lossy().into_owned());
            }
        }
        summary.tables += db.store_extracted_tables(file_name, &batch.tables)?;
        summary.batches += 1;
    }

    tracing::info!(
        "stored {} tables in {} batches for {file_name}",
        summary.tables,
        summary.batches
    );
    Ok(summary)
}
