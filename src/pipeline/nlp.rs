//! Text normalization and entity extraction over stored chunks.

use rayon::prelude::*;
use serde::Serialize;

use crate::db::Database;
use crate::error::Result;
use crate::nlp::entities::EntityRecognizer;
use crate::nlp::preprocess::enhanced_preprocess_text;

/// Result of the NLP pass over one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NlpSummary {
    pub file_name: String,
    pub chunks: usize,
    pub processed: usize,
}

/// Result of entity extraction over one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntitySummary {
    pub file_name: String,
    pub texts: usize,
    pub entities: usize,
}

/// Normalize every chunk of `file_name` and store one processed text per chunk.
///
/// An unknown file is logged by the store and yields an empty summary.
pub fn apply_nlp(db: &mut Database, file_name: &str) -> Result<NlpSummary> {
    let chunks = db.get_chunks_for_file(file_name)?;
    let mut summary = NlpSummary {
        file_name: file_name.to_string(),
        chunks: chunks.len(),
        ..Default::default()
    };
    if chunks.is_empty() {
        return Ok(summary);
    }

    let texts: Vec<String> = chunks
        .par_iter()
        .map(|chunk| enhanced_preprocess_text(&chunk.content))
        .collect();
    summary.processed = db.store_processed_text(file_name, &texts)?;
    tracing::info!("processed {} chunks of {file_name}", summary.processed);
    Ok(summary)
}

/// Recognize entities in every processed text of `file_name` and store them
/// against the processed text row they were found in.
pub fn extract_entities(db: &mut Database, file_name: &str) -> Result<EntitySummary> {
    let recognizer = EntityRecognizer::new()?;
    let texts = db.get_processed_texts(file_name)?;
    let mut summary = EntitySummary {
        file_name: file_name.to_string(),
        texts: texts.len(),
        ..Default::default()
    };

    for text in &texts {
        let mentions = recognizer.recognize(&text.content);
        if !mentions.is_empty() {
            summary.entities += db.store_entities(text.id, &mentions)?;
        }
    }
    tracing::info!(
        "found {} entities in {} processed texts of {file_name}",
        summary.entities,
        summary.texts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_chunks(name: &str, chunks: &[&str]) -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let chunks: Vec<String> = chunks.iter().map(|s| (*s).to_string()).collect();
        db.store_file_with_chunks(name, &chunks).unwrap();
        db
    }

    #[test]
    fn nlp_pass_stores_lemmatized_text() {
        let mut db = db_with_chunks("doc.pdf", &["the cats are running", "a dog barks"]);
        let summary = apply_nlp(&mut db, "doc.pdf").unwrap();
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.processed, 2);

        let mut contents: Vec<String> = db
            .get_processed_texts("doc.pdf")
            .unwrap()
            .into_iter()
            .map(|p| p.content)
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["cat run", "dog bark"]);
    }

    #[test]
    fn nlp_on_unknown_file_is_empty() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = apply_nlp(&mut db, "missing.pdf").unwrap();
        assert_eq!(summary.chunks, 0);
        assert_eq!(summary.processed, 0);
        assert!(db.list_files().unwrap().is_empty());
    }

    #[test]
    fn entities_reference_processed_rows() {
        let mut db = db_with_chunks(
            "doc.pdf",
            &["Revenue grew 12 percent in March 2021.", "No numbers here at all."],
        );
        apply_nlp(&mut db, "doc.pdf").unwrap();
        let summary = extract_entities(&mut db, "doc.pdf").unwrap();
        assert_eq!(summary.texts, 2);
        assert_eq!(summary.entities, 2);

        let rows = db.get_processed_texts("doc.pdf").unwrap();
        let entities = db.get_entities_by_file("doc.pdf").unwrap();
        let labels: Vec<&str> = entities.iter().map(|e| e.entity_label.as_str()).collect();
        assert_eq!(labels, vec!["PERCENT", "DATE"]);
        assert!(entities.iter().all(|e| e.chunk_id == rows[0].id));
    }

    #[test]
    fn entities_on_unknown_file_is_empty() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = extract_entities(&mut db, "missing.pdf").unwrap();
        assert_eq!(summary.entities, 0);
    }
}
