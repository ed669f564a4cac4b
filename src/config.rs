use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocmineError, Result};

/// Default database filename, created in the working directory.
const DB_FILE: &str = "text_data.db";
/// Config filename.
const CONFIG_FILE: &str = "docmine.toml";

/// Run configuration resolved from the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the tool runs in. Side files land here by default.
    pub work_dir: PathBuf,
    /// Path to the `SQLite` database.
    pub db_path: PathBuf,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// User settings loaded from docmine.toml.
    pub settings: UserSettings,
}

/// User-configurable settings from docmine.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub extraction: ExtractionSettings,
    pub topics: TopicSettings,
    pub embedding: EmbeddingSettings,
    pub clustering: ClusteringSettings,
    pub dispatcher: DispatcherSettings,
}

/// PDF extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Pages per extraction batch.
    pub page_batch_size: usize,
    /// Whether table batches are also written as side files.
    pub write_side_files: bool,
    /// Directory for side files (relative to the working directory).
    pub side_file_dir: Option<String>,
    /// Glue single-character fragments onto the preceding word.
    pub stitch_fragments: bool,
    /// Collapse runs of repeated characters (overprinted glyphs).
    pub dedupe_chars: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            page_batch_size: 10,
            write_side_files: true,
            side_file_dir: None,
            stitch_fragments: false,
            dedupe_chars: false,
        }
    }
}

/// Topic model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSettings {
    pub num_topics: usize,
    /// Terms listed per topic summary.
    pub num_words: usize,
    /// Gibbs sampling sweeps.
    pub iterations: usize,
    pub seed: u64,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            num_topics: 20,
            num_words: 10,
            iterations: 200,
            seed: 42,
        }
    }
}

/// Embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Vector width.
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

/// k-means settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringSettings {
    /// Requested cluster count, clamped to the number of embeddings.
    pub clusters: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            clusters: 100,
            max_iterations: 300,
            seed: 42,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    pub workers: usize,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

impl Config {
    /// Create config for a given working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let db_path = work_dir.join(DB_FILE);
        let config_path = work_dir.join(CONFIG_FILE);

        let settings = Self::load_settings(&config_path).unwrap_or_default();

        Self {
            work_dir,
            db_path,
            config_path,
            settings,
        }
    }

    /// Create config from the current working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| DocmineError::Config(format!("cannot get cwd: {e}")))?;
        Ok(Self::new(cwd))
    }

    /// Load settings from docmine.toml if it exists.
    fn load_settings(config_path: &Path) -> Option<UserSettings> {
        if !config_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(config_path).ok()?;
        match toml::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("ignoring invalid {}: {e}", config_path.display());
                None
            }
        }
    }

    /// Point the database somewhere other than the working directory.
    #[must_use]
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        self.db_path = if db_path.is_absolute() {
            db_path
        } else {
            self.work_dir.join(db_path)
        };
        self
    }

    /// Directory that receives table side files.
    #[must_use]
    pub fn side_file_dir(&self) -> PathBuf {
        match &self.settings.extraction.side_file_dir {
            Some(dir) => self.work_dir.join(dir),
            None => self.work_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_new_sets_paths() {
        let cfg = Config::new("/tmp/project");
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/project"));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/project/text_data.db"));
        assert_eq!(cfg.config_path, PathBuf::from("/tmp/project/docmine.toml"));
    }

    #[test]
    fn default_settings() {
        let settings = UserSettings::default();
        assert_eq!(settings.extraction.page_batch_size, 10);
        assert!(settings.extraction.write_side_files);
        assert!(!settings.extraction.stitch_fragments);
        assert_eq!(settings.topics.num_topics, 20);
        assert_eq!(settings.topics.seed, 42);
        assert_eq!(settings.embedding.dimensions, 768);
        assert_eq!(settings.clustering.clusters, 100);
        assert_eq!(settings.dispatcher.workers, 2);
    }

    #[test]
    fn load_settings_from_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("docmine.toml"),
            "[extraction]\npage_batch_size = 4\n\n[clustering]\nclusters = 7\n",
        )
        .unwrap();
        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings.extraction.page_batch_size, 4);
        assert_eq!(cfg.settings.clustering.clusters, 7);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("docmine.toml"), "[topics]\nnum_topics = 5\n").unwrap();
        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings.topics.num_topics, 5);
        assert_eq!(cfg.settings.topics.num_words, 10);
        assert_eq!(cfg.settings.dispatcher.workers, 2);
    }

    #[test]
    fn load_invalid_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("docmine.toml"), "invalid toml {{{{").unwrap();
        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings.extraction.page_batch_size, 10);
    }

    #[test]
    fn relative_db_path_resolves_against_work_dir() {
        let cfg = Config::new("/tmp/project").with_db_path("data/other.db");
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/project/data/other.db"));
        let cfg = Config::new("/tmp/project").with_db_path("/var/db.sqlite");
        assert_eq!(cfg.db_path, PathBuf::from("/var/db.sqlite"));
    }

    #[test]
    fn side_file_dir_defaults_to_work_dir() {
        let mut cfg = Config::new("/tmp/project");
        assert_eq!(cfg.side_file_dir(), PathBuf::from("/tmp/project"));
        cfg.settings.extraction.side_file_dir = Some("tables".into());
        assert_eq!(cfg.side_file_dir(), PathBuf::from("/tmp/project/tables"));
    }
}
