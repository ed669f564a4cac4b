//! Topic modeling, embedding and clustering over processed text.

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::clustering::{kmeans, KMeansConfig};
use crate::analysis::embedding::{Embedder, HashingEmbedder};
use crate::analysis::topics::{Dictionary, LdaConfig, LdaModel};
use crate::config::{ClusteringSettings, EmbeddingSettings, TopicSettings};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ClusterAssignment, EmbeddingRecord};

/// Result of topic modeling over one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicSummary {
    pub file_name: String,
    pub documents: usize,
    pub vocabulary: usize,
    pub topics: Vec<String>,
}

/// Result of embedding one file's processed texts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingSummary {
    pub file_name: String,
    pub embedded: usize,
    pub dimensions: usize,
}

/// Result of clustering one file's embeddings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterSummary {
    pub file_name: String,
    pub points: usize,
    /// Distinct labels assigned.
    pub clusters: usize,
}

/// Fit a topic model to the processed texts of `file_name` and replace its topics.
///
/// A file with no processed text (or only empty text) keeps its previous
/// topics and reports none.
pub fn generate_topics(
    db: &mut Database,
    settings: &TopicSettings,
    file_name: &str,
) -> Result<TopicSummary> {
    let texts = db.get_processed_texts(file_name)?;
    let docs: Vec<Vec<&str>> = texts
        .iter()
        .map(|t| t.content.split_whitespace().collect())
        .collect();
    let dictionary = Dictionary::from_documents(&docs);
    let mut summary = TopicSummary {
        file_name: file_name.to_string(),
        documents: docs.len(),
        vocabulary: dictionary.len(),
        ..Default::default()
    };
    if dictionary.is_empty() {
        tracing::warn!("no processed text for {file_name}, skipping topic model");
        return Ok(summary);
    }

    let corpus: Vec<Vec<(usize, usize)>> = docs.iter().map(|d| dictionary.doc2bow(d)).collect();
    let config = LdaConfig {
        num_topics: settings.num_topics,
        iterations: settings.iterations,
        seed: settings.seed,
        ..LdaConfig::default()
    };
    let model = LdaModel::fit(&corpus, dictionary, &config);
    summary.topics = model.print_topics(settings.num_words);
    db.replace_topics(file_name, &summary.topics)?;
    tracing::info!(
        "stored {} topics for {file_name} ({} documents, {} terms)",
        summary.topics.len(),
        summary.documents,
        summary.vocabulary
    );
    Ok(summary)
}

/// Embed the processed texts of `file_name` with the hashing embedder.
pub fn generate_embeddings(
    db: &mut Database,
    settings: &EmbeddingSettings,
    file_name: &str,
) -> Result<EmbeddingSummary> {
    embed_processed_texts(db, &HashingEmbedder::new(settings.dimensions), file_name)
}

/// Embed the processed texts of `file_name` and replace its embeddings.
///
/// Vectors are keyed by their position in the batch of texts read here.
pub fn embed_processed_texts(
    db: &mut Database,
    embedder: &dyn Embedder,
    file_name: &str,
) -> Result<EmbeddingSummary> {
    let texts = db.get_processed_texts(file_name)?;
    let mut summary = EmbeddingSummary {
        file_name: file_name.to_string(),
        dimensions: embedder.dimensions(),
        ..Default::default()
    };
    if texts.is_empty() {
        return Ok(summary);
    }

    let records: Vec<EmbeddingRecord> = texts
        .par_iter()
        .enumerate()
        .map(|(index, text)| EmbeddingRecord {
            file_name: file_name.to_string(),
            chunk_index: index as i64,
            vector: embedder.embed(&text.content),
        })
        .collect();
    summary.embedded = db.replace_embeddings(file_name, &records)?;
    tracing::info!("stored {} embeddings for {file_name}", summary.embedded);
    Ok(summary)
}

/// Cluster the stored embeddings of `file_name` and replace its cluster labels.
pub fn cluster_embeddings(
    db: &mut Database,
    settings: &ClusteringSettings,
    file_name: &str,
) -> Result<ClusterSummary> {
    let embeddings = db.get_embeddings_by_file(file_name)?;
    let mut summary = ClusterSummary {
        file_name: file_name.to_string(),
        points: embeddings.len(),
        ..Default::default()
    };
    if embeddings.is_empty() {
        tracing::warn!("no embeddings for {file_name}, skipping clustering");
        return Ok(summary);
    }

    let vectors: Vec<Vec<f32>> = embeddings.iter().map(|e| e.vector.clone()).collect();
    let config = KMeansConfig {
        clusters: settings.clusters,
        max_iterations: settings.max_iterations,
        seed: settings.seed,
    };
    let labels = kmeans(&vectors, &config);

    let assignments: Vec<ClusterAssignment> = embeddings
        .iter()
        .zip(&labels)
        .map(|(e, &label)| ClusterAssignment {
            file_name: file_name.to_string(),
            chunk_index: e.chunk_index,
            cluster_label: label as i64,
        })
        .collect();
    let mut distinct = labels;
    distinct.sort_unstable();
    distinct.dedup();
    summary.clusters = distinct.len();

    db.replace_clusters(file_name, &assignments)?;
    tracing::info!(
        "assigned {} embeddings of {file_name} to {} clusters",
        summary.points,
        summary.clusters
    );
    Ok(summary)
}
