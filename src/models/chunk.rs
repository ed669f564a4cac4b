use serde::Serialize;

/// A bounded-length substring of a file's extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct TextChunk {
    /// Database row ID (0 if not yet persisted).
    pub id: i64,
    /// Foreign key to the file record.
    pub file_id: i64,
    /// Order of the chunk within its file (0-based).
    pub position: i64,
    pub content: String,
}

/// Chunk content after lowercasing, lemmatization and stop-word removal.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedText {
    pub id: i64,
    pub file_id: i64,
    pub content: String,
}

/// A table rendered as tab-separated rows.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedTable {
    pub id: i64,
    pub file_id: i64,
    pub content: String,
}
