use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{DocmineError, Result};
use crate::ingest::pdf::{page_batches, PageSource};

/// A table as rows of cell strings.
pub type Table = Vec<Vec<String>>;

/// Cell separator in laid-out text: a tab or a gap of two or more spaces.
const CELL_GAP: &str = r"\t+| {2,}";

/// Tables found in one batch of pages.
#[derive(Debug, Clone)]
pub struct TableBatch {
    /// 0-based batch number.
    pub index: usize,
    pub first_page: usize,
    pub last_page: usize,
    pub tables: Vec<Table>,
}

/// Render a table as tab-separated cells and newline-separated rows.
#[must_use]
pub fn table_to_string(table: &[Vec<String>]) -> String {
    table
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Finds column-aligned tables in laid-out page text, such as the pages of a
/// [`PdfLayout`](crate::ingest::layout::PdfLayout).
pub struct TableDetector {
    cell_gap: Regex,
}

impl TableDetector {
    pub fn new() -> Result<Self> {
        let cell_gap = Regex::new(CELL_GAP)
            .map_err(|e| DocmineError::Other(format!("invalid regex: {e}")))?;
        Ok(Self { cell_gap })
    }

    /// Split one line of laid-out text into cells.
    fn split_cells(&self, line: &str) -> Vec<String> {
        self.cell_gap
            .split(line.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Detect tables in the text of one page.
    ///
    /// A table is a run of at least two consecutive lines that each split into
    /// the same number (two or more) of cells.
    #[must_use]
    pub fn detect(&self, page: &str) -> Vec<Table> {
        let mut tables = Vec::new();
        let mut current: Table = Vec::new();

        let mut flush = |current: &mut Table| {
            if current.len() >= 2 {
                tables.push(std::mem::take(current));
            } else {
                current.clear();
            }
        };

        for line in page.lines() {
            let cells = self.split_cells(line);
            if cells.len() < 2 {
                flush(&mut current);
                continue;
            }
            if current.first().is_some_and(|row| row.len() != cells.len()) {
                flush(&mut current);
            }
            current.push(cells);
        }
        flush(&mut current);
        tables
    }
}

/// Walk `source` in page batches and collect the tables of each batch.
///
/// One batch is yielded per group of `batch_size` pages, even when the group
/// has no tables.
pub fn table_batches<'a, S: PageSource + ?Sized>(
    source: &'a S,
    batch_size: usize,
    detector: &'a TableDetector,
) -> impl Iterator<Item = Result<TableBatch>> + 'a {
    page_batches(source, batch_size)
        .enumerate()
        .map(|(index, batch)| -> Result<TableBatch> {
            let batch = batch?;
            let tables = batch.pages.iter().flat_map(|p| detector.detect(p)).collect();
            Ok(TableBatch {
                index,
                first_page: batch.first_page,
                last_page: batch.last_page(),
                tables,
            })
        })
}

/// Write each table of a batch to `dir/batch_{b}_table_{t}.tsv`.
pub fn write_side_files(dir: &Path, batch: &TableBatch) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(batch.tables.len());
    for (t, table) in batch.tables.iter().enumerate() {
        let path = dir.join(format!("batch_{}_table_{t}.tsv", batch.index));
        std::fs::write(&path, table_to_string(table))?;
        written.push(path);
    }
    Ok(written)
}
