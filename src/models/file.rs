use serde::Serialize;

/// A source document. `file_name` is the identity key every derived row traces back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Database row ID.
    pub id: i64,
    /// Name the file was submitted under (the PDF path as given).
    pub file_name: String,
}
