use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocmineError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf error in {path}: {detail}")]
    Pdf { path: String, detail: String },

    #[error("unsupported file format '{ext}' for {path}: expected csv, tsv, xls or xlsx")]
    UnsupportedFormat { path: String, ext: String },

    #[error("cannot read data file {path}: {detail}")]
    Tabular { path: String, detail: String },

    #[error("migration {version} failed: {detail}")]
    Migration { version: u32, detail: String },

    #[error("task panicked: {task}")]
    TaskPanicked { task: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DocmineError>;
