use std::path::Path;

use crate::error::{DocmineError, Result};

/// Page-addressable text of a document.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Text of the page at `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String>;
}

/// A PDF whose text has been extracted page by page.
pub struct PdfDocument {
    path: String,
    pages: Vec<String>,
}

impl PdfDocument {
    /// Read and extract a PDF file.
    ///
    /// Fails with an I/O error if the file cannot be read and a PDF error if
    /// it cannot be parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocmineError::Pdf {
                path: path.to_string_lossy().into(),
                detail: format!("PDF extraction error: {e}"),
            }
        })?;
        Ok(Self::from_pages(path.to_string_lossy(), pages))
    }

    /// Build a document from already extracted page texts.
    #[must_use]
    pub fn from_pages(path: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            path: path.into(),
            pages,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PageSource for PdfDocument {
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

impl<S: AsRef<str>> PageSource for Vec<S> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.get(index)
            .map(|p| p.as_ref().to_string())
            .ok_or_else(|| DocmineError::Other(format!("page {} out of range", index + 1)))
    }
}

/// A run of consecutive pages.
#[derive(Debug, Clone)]
pub struct PageBatch {
    /// 1-based number of the first page in the batch.
    pub first_page: usize,
    pub pages: Vec<String>,
}

impl PageBatch {
    /// 1-based number of the last page in the batch.
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.first_page + self.pages.len().saturating_sub(1)
    }
}

/// Iterator over fixed-size page batches of a [`PageSource`].
pub struct PageBatches<'a, S: PageSource + ?Sized> {
    source: &'a S,
    batch_size: usize,
    next: usize,
}

impl<S: PageSource + ?Sized> Iterator for PageBatches<'_, S> {
    type Item = Result<PageBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.source.page_count();
        if self.next >= total {
            return None;
        }
        let start = self.next;
        let end = (start + self.batch_size).min(total);
        self.next = end;
        let pages: Result<Vec<String>> = (start..end).map(|i| self.source.page_text(i)).collect();
        Some(pages.map(|pages| PageBatch {
            first_page: start + 1,
            pages,
        }))
    }
}

/// Walk `source` in batches of `batch_size` pages (at least one).
pub fn page_batches<S: PageSource + ?Sized>(source: &S, batch_size: usize) -> PageBatches<'_, S> {
    PageBatches {
        source,
        batch_size: batch_size.max(1),
        next: 0,
    }
}
