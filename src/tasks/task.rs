use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::pipeline;

/// One unit of work for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Create or migrate the store.
    InitDb,
    /// Extract the text of a PDF into chunks.
    ProcessPdf(PathBuf),
    /// Extract the tables of a PDF.
    ExtractTables(PathBuf),
    /// Normalize the chunks of a stored file.
    ApplyNlp(String),
    /// Tag money, percent, date and number mentions in the processed texts.
    ExtractEntities(String),
    /// Fit a topic model over the processed texts of a file.
    GenerateTopics(String),
    /// Embed each processed text of a file.
    GenerateEmbeddings(String),
    /// Group the stored embeddings of a file with k-means.
    ClusterEmbeddings(String),
}

impl Task {
    /// Stable task name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitDb => "initDB",
            Self::ProcessPdf(_) => "process_pdf",
            Self::ExtractTables(_) => "extract_tables",
            Self::ApplyNlp(_) => "apply_nlp",
            Self::ExtractEntities(_) => "extract_entities",
            Self::GenerateTopics(_) => "generate_topics",
            Self::GenerateEmbeddings(_) => "generate_embeddings",
            Self::ClusterEmbeddings(_) => "cluster_embeddings",
        }
    }

    /// The file path or file name the task works on.
    #[must_use]
    pub fn arg(&self) -> Option<String> {
        match self {
            Self::InitDb => None,
            Self::ProcessPdf(path) | Self::ExtractTables(path) => {
                Some(path.to_string_lossy().into_owned())
            }
            Self::ApplyNlp(name)
            | Self::ExtractEntities(name)
            | Self::GenerateTopics(name)
            | Self::GenerateEmbeddings(name)
            | Self::ClusterEmbeddings(name) => Some(name.clone()),
        }
    }

    /// Run the task on its own connection and return its summary as JSON.
    ///
    /// Summaries of file-scoped tasks carry the file's row counts under `stats`.
    pub fn execute(&self, ctx: &TaskContext) -> Result<Value> {
        let settings = &ctx.config.settings;
        let mut db = ctx.store.open()?;
        let mut summary = match self {
            Self::InitDb => serde_json::json!({
                "db": ctx.store.path().to_string_lossy(),
                "schema_version": db.schema_version()?,
            }),
            Self::ProcessPdf(path) => serde_json::to_value(
                pipeline::extract_pdf_content_and_store(&mut db, &settings.extraction, path)?,
            )?,
            Self::ExtractTables(path) => {
                let side_dir = settings
                    .extraction
                    .write_side_files
                    .then(|| ctx.config.side_file_dir());
                serde_json::to_value(pipeline::extract_pdf_tables_and_store(
                    &mut db,
                    &settings.extraction,
                    side_dir.as_deref(),
                    path,
                )?)?
            }
            Self::ApplyNlp(name) => serde_json::to_value(pipeline::apply_nlp(&mut db, name)?)?,
            Self::ExtractEntities(name) => {
                serde_json::to_value(pipeline::extract_entities(&mut db, name)?)?
            }
            Self::GenerateTopics(name) => serde_json::to_value(pipeline::generate_topics(
                &mut db,
                &settings.topics,
                name,
            )?)?,
            Self::GenerateEmbeddings(name) => serde_json::to_value(
                pipeline::generate_embeddings(&mut db, &settings.embedding, name)?,
            )?,
            Self::ClusterEmbeddings(name) => serde_json::to_value(pipeline::cluster_embeddings(
                &mut db,
                &settings.clustering,
                name,
            )?)?,
        };
        if let (Some(name), Value::Object(fields)) = (self.arg(), &mut summary) {
            fields.insert("stats".into(), serde_json::to_value(db.file_stats(&name)?)?);
        }
        Ok(summary)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg() {
            Some(arg) => write!(f, "{}({arg})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Everything a worker needs to run tasks.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub store: Store,
    pub config: Config,
}

impl TaskContext {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            store: Store::new(&config.db_path),
            config,
        }
    }
}

/// Outcome of one task, as printed in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    #[must_use]
    pub fn new(task: &Task, outcome: Result<Value>) -> Self {
        let (summary, error) = match outcome {
            Ok(summary) => (Some(summary), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            task: task.name().to_string(),
            arg: task.arg(),
            ok: error.is_none(),
            summary,
            error,
        }
    }
}
