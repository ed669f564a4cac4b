use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;

use crate::error::Result;
use crate::ingest::tables::{table_to_string, Table};
use crate::models::analysis::{
    ClusterAssignment, EmbeddingRecord, EntityMention, EntityRecord, TopicRecord,
};
use crate::models::chunk::{ExtractedTable, ProcessedText, TextChunk};
use crate::models::file::FileRecord;

use super::Database;

/// Row counts for one file across every derived table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub chunks: u64,
    pub processed_texts: u64,
    pub tables: u64,
    pub entities: u64,
    pub topics: u64,
    pub embeddings: u64,
    pub clusters: u64,
}

impl Database {
    // ─── File operations ───

    /// Return the ID for `file_name`, inserting the row if it does not exist.
    ///
    /// Runs as a single upsert so two writers racing on the same name end up
    /// with one row.
    pub fn ensure_file(conn: &Connection, file_name: &str) -> Result<i64> {
        conn.execute(
            "INSERT INTO files (file_name) VALUES (?1) ON CONFLICT(file_name) DO NOTHING",
            params![file_name],
        )?;
        // last_insert_rowid() is stale when the insert was skipped,
        // so always query back the actual ID.
        let id: i64 = conn.query_row(
            "SELECT id FROM files WHERE file_name = ?1",
            params![file_name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Get a file record by name.
    pub fn find_file(&self, file_name: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, file_name FROM files WHERE file_name = ?1",
                params![file_name],
                |row| {
                    Ok(FileRecord {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    /// Get all file records.
    pub fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, file_name FROM files ORDER BY file_name")?;
        let rows = stmt.query_map([], |row| {
            Ok(FileRecord {
                id: row.get(0)?,
                file_name: row.get(1)?,
            })
        })?;
        let mut files = Vec::new();
        for r in rows {
            files.push(r?);
        }
        Ok(files)
    }

    /// Look up a file ID, logging a warning on a miss.
    fn file_id_or_warn(&self, file_name: &str) -> Result<Option<i64>> {
        let file = self.find_file(file_name)?;
        if file.is_none() {
            tracing::warn!("no file found with name: {file_name}");
        }
        Ok(file.map(|f| f.id))
    }

    // ─── Chunk operations ───

    /// Store chunks for a file, creating the file row on first reference.
    ///
    /// Positions continue after any chunks already stored for the file.
    pub fn store_file_with_chunks(&mut self, file_name: &str, chunks: &[String]) -> Result<usize> {
        let tx = self.begin_transaction()?;
        let file_id = Self::ensure_file(&tx, file_name)?;
        let next: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM text_chunks WHERE file_id = ?1",
            params![file_id],
            |r| r.get(0),
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO text_chunks (file_id, position, chunk_content) VALUES (?1, ?2, ?3)",
            )?;
            for (offset, chunk) in chunks.iter().enumerate() {
                stmt.execute(params![file_id, next + offset as i64, chunk])?;
            }
        }
        tx.commit()?;
        Ok(chunks.len())
    }

    /// Get the chunks of a file in order. Empty if the file is unknown.
    pub fn get_chunks_for_file(&self, file_name: &str) -> Result<Vec<TextChunk>> {
        let Some(file_id) = self.file_id_or_warn(file_name)? else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn().prepare(
            "SELECT id, file_id, position, chunk_content FROM text_chunks
             WHERE file_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![file_id], |row| {
            Ok(TextChunk {
                id: row.get(0)?,
                file_id: row.get(1)?,
                position: row.get(2)?,
                content: row.get(3)?,
            })
        })?;
        let mut chunks = Vec::new();
        for r in rows {
            chunks.push(r?);
        }
        Ok(chunks)
    }

    // ─── Processed text operations ───

    /// Store NLP output for an existing file. Stores nothing if the file is unknown.
    pub fn store_processed_text(&mut self, file_name: &str, texts: &[String]) -> Result<usize> {
        let Some(file_id) = self.file_id_or_warn(file_name)? else {
            return Ok(0);
        };
        let tx = self.begin_transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO processed_texts (file_id, content) VALUES (?1, ?2)")?;
            for text in texts {
                stmt.execute(params![file_id, text])?;
            }
        }
        tx.commit()?;
        Ok(texts.len())
    }

    /// Get the processed texts of a file. Empty if the file is unknown.
    pub fn get_processed_texts(&self, file_name: &str) -> Result<Vec<ProcessedText>> {
        let Some(file_id) = self.file_id_or_warn(file_name)? else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn().prepare(
            "SELECT id, file_id, content FROM processed_texts WHERE file_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file_id], |row| {
            Ok(ProcessedText {
                id: row.get(0)?,
                file_id: row.get(1)?,
                content: row.get(2)?,
            })
        })?;
        let mut texts = Vec::new();
        for r in rows {
            texts.push(r?);
        }
        Ok(texts)
    }

    // ─── Table operations ───

    /// Store a batch of tables, creating the file row on first reference.
    pub fn store_extracted_tables(&mut self, file_name: &str, tables: &[Table]) -> Result<usize> {
        let tx = self.begin_transaction()?;
        let file_id = Self::ensure_file(&tx, file_name)?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO extracted_tables (file_id, content) VALUES (?1, ?2)")?;
            for table in tables {
                stmt.execute(params![file_id, table_to_string(table)])?;
            }
        }
        tx.commit()?;
        Ok(tables.len())
    }

    /// Get the stored tables of a file. Empty if the file is unknown.
    pub fn get_tables_for_file(&self, file_name: &str) -> Result<Vec<ExtractedTable>> {
        let Some(file_id) = self.file_id_or_warn(file_name)? else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn().prepare(
            "SELECT id, file_id, content FROM extracted_tables WHERE file_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file_id], |row| {
            Ok(ExtractedTable {
                id: row.get(0)?,
                file_id: row.get(1)?,
                content: row.get(2)?,
            })
        })?;
        let mut tables = Vec::new();
        for r in rows {
            tables.push(r?);
        }
        Ok(tables)
    }

    // ─── Entity operations ───

    /// Store entity mentions found in one processed text row.
    pub fn store_entities(
        &mut self,
        processed_text_id: i64,
        entities: &[EntityMention],
    ) -> Result<usize> {
        let tx = self.begin_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO entities (entity_text, entity_label, chunk_id) VALUES (?1, ?2, ?3)",
            )?;
            for entity in entities {
                stmt.execute(params![entity.text, entity.label, processed_text_id])?;
            }
        }
        tx.commit()?;
        Ok(entities.len())
    }

    /// Get all entity mentions for a file, through its processed texts.
    pub fn get_entities_by_file(&self, file_name: &str) -> Result<Vec<EntityRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT e.id, e.entity_text, e.entity_label, e.chunk_id
             FROM entities e
             JOIN processed_texts p ON e.chunk_id = p.id
             JOIN files f ON p.file_id = f.id
             WHERE f.file_name = ?1
             ORDER BY e.id",
        )?;
        let rows = stmt.query_map(params![file_name], |row| {
            Ok(EntityRecord {
                id: row.get(0)?,
                entity_text: row.get(1)?,
                entity_label: row.get(2)?,
                chunk_id: row.get(3)?,
            })
        })?;
        let mut entities = Vec::new();
        for r in rows {
            entities.push(r?);
        }
        Ok(entities)
    }

    // ─── Topic operations ───

    /// Replace the topics of a file.
    pub fn replace_topics(&mut self, file_name: &str, topics: &[String]) -> Result<usize> {
        let tx = self.begin_transaction()?;
        tx.execute("DELETE FROM topics WHERE file_name = ?1", params![file_name])?;
        {
            let mut stmt = tx.prepare("INSERT INTO topics (file_name, topic) VALUES (?1, ?2)")?;
            for topic in topics {
                stmt.execute(params![file_name, topic])?;
            }
        }
        tx.commit()?;
        Ok(topics.len())
    }

    /// Get the topics of a file.
    pub fn get_topics_by_file(&self, file_name: &str) -> Result<Vec<TopicRecord>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT file_name, topic FROM topics WHERE file_name = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![file_name], |row| {
            Ok(TopicRecord {
                file_name: row.get(0)?,
                topic: row.get(1)?,
            })
        })?;
        let mut topics = Vec::new();
        for r in rows {
            topics.push(r?);
        }
        Ok(topics)
    }

    // ─── Embedding operations ───

    /// Replace the embeddings of a file.
    pub fn replace_embeddings(
        &mut self,
        file_name: &str,
        embeddings: &[EmbeddingRecord],
    ) -> Result<usize> {
        let tx = self.begin_transaction()?;
        tx.execute(
            "DELETE FROM embeddings WHERE file_name = ?1",
            params![file_name],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO embeddings (file_name, chunk_index, embedding) VALUES (?1, ?2, ?3)",
            )?;
            for e in embeddings {
                stmt.execute(params![
                    file_name,
                    e.chunk_index,
                    EmbeddingRecord::encode_vector(&e.vector)
                ])?;
            }
        }
        tx.commit()?;
        Ok(embeddings.len())
    }

    /// Get the embeddings of a file ordered by chunk index.
    pub fn get_embeddings_by_file(&self, file_name: &str) -> Result<Vec<EmbeddingRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT file_name, chunk_index, embedding FROM embeddings
             WHERE file_name = ?1 ORDER BY chunk_index, id",
        )?;
        let rows = stmt.query_map(params![file_name], |row| {
            let bytes: Vec<u8> = row.get(2)?;
            Ok(EmbeddingRecord {
                file_name: row.get(0)?,
                chunk_index: row.get(1)?,
                vector: EmbeddingRecord::decode_vector(&bytes),
            })
        })?;
        let mut embeddings = Vec::new();
        for r in rows {
            embeddings.push(r?);
        }
        Ok(embeddings)
    }

    // ─── Cluster operations ───

    /// Replace the cluster assignments of a file.
    pub fn replace_clusters(
        &mut self,
        file_name: &str,
        clusters: &[ClusterAssignment],
    ) -> Result<usize> {
        let tx = self.begin_transaction()?;
        tx.execute("DELETE FROM clusters WHERE file_name = ?1", params![file_name])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO clusters (file_name, chunk_index, cluster_label) VALUES (?1, ?2, ?3)",
            )?;
            for c in clusters {
                stmt.execute(params![file_name, c.chunk_index, c.cluster_label])?;
            }
        }
        tx.commit()?;
        Ok(clusters.len())
    }

    /// Get the cluster assignments of a file ordered by chunk index.
    pub fn get_clusters_by_file(&self, file_name: &str) -> Result<Vec<ClusterAssignment>> {
        let mut stmt = self.conn().prepare(
            "SELECT file_name, chunk_index, cluster_label FROM clusters
             WHERE file_name = ?1 ORDER BY chunk_index, id",
        )?;
        let rows = stmt.query_map(params![file_name], |row| {
            Ok(ClusterAssignment {
                file_name: row.get(0)?,
                chunk_index: row.get(1)?,
                cluster_label: row.get(2)?,
            })
        })?;
        let mut clusters = Vec::new();
        for r in rows {
            clusters.push(r?);
        }
        Ok(clusters)
    }

    // ─── Statistics ───

    /// Count derived rows for a file. All zero if the file is unknown.
    pub fn file_stats(&self, file_name: &str) -> Result<FileStats> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self
                .conn()
                .query_row(sql, params![file_name], |r| r.get(0))?;
            Ok(n as u64)
        };
        Ok(FileStats {
            chunks: count(
                "SELECT COUNT(*) FROM text_chunks c JOIN files f ON c.file_id = f.id WHERE f.file_name = ?1",
            )?,
            processed_texts: count(
                "SELECT COUNT(*) FROM processed_texts p JOIN files f ON p.file_id = f.id WHERE f.file_name = ?1",
            )?,
            tables: count(
                "SELECT COUNT(*) FROM extracted_tables t JOIN files f ON t.file_id = f.id WHERE f.file_name = ?1",
            )?,
            entities: count(
                "SELECT COUNT(*) FROM entities e
                 JOIN processed_texts p ON e.chunk_id = p.id
                 JOIN files f ON p.file_id = f.id WHERE f.file_name = ?1",
            )?,
            topics: count("SELECT COUNT(*) FROM topics WHERE file_name = ?1")?,
            embeddings: count("SELECT COUNT(*) FROM embeddings WHERE file_name = ?1")?,
            clusters: count("SELECT COUNT(*) FROM clusters WHERE file_name = ?1")?,
        })
    }

    /// Begin a transaction for batch operations.
    pub fn begin_transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn_mut().transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn file_count(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn store_chunks_creates_file_once() {
        let mut db = Database::open_in_memory().unwrap();
        db.store_file_with_chunks("doc.pdf", &strings(&["one"]))
            .unwrap();
        assert_eq!(file_count(&db), 1);

        db.store_file_with_chunks("doc.pdf", &strings(&["two", "three"]))
            .unwrap();
        assert_eq!(file_count(&db), 1);

        let chunks = db.get_chunks_for_file("doc.pdf").unwrap();
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        let positions: Vec<_> = chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn ensure_file_returns_same_id() {
        let db = Database::open_in_memory().unwrap();
        let a = Database::ensure_file(db.conn(), "a.pdf").unwrap();
        let b = Database::ensure_file(db.conn(), "a.pdf").unwrap();
        let c = Database::ensure_file(db.conn(), "c.pdf").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(db.list_files().unwrap().len(), 2);
    }

    #[test]
    fn missing_file_reads_are_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.find_file("nope.pdf").unwrap().is_none());
        assert!(db.get_chunks_for_file("nope.pdf").unwrap().is_empty());
        assert!(db.get_processed_texts("nope.pdf").unwrap().is_empty());
        assert!(db.get_tables_for_file("nope.pdf").unwrap().is_empty());
        assert!(db.get_entities_by_file("nope.pdf").unwrap().is_empty());
        assert!(db.get_topics_by_file("nope.pdf").unwrap().is_empty());
        assert!(db.get_embeddings_by_file("nope.pdf").unwrap().is_empty());
        assert!(db.get_clusters_by_file("nope.pdf").unwrap().is_empty());
        assert_eq!(db.file_stats("nope.pdf").unwrap(), FileStats::default());
    }

    #[test]
    fn processed_text_for_missing_file_stores_nothing() {
        let mut db = Database::open_in_memory().unwrap();
        let stored = db
            .store_processed_text("ghost.pdf", &strings(&["cat run"]))
            .unwrap();
        assert_eq!(stored, 0);
        assert_eq!(file_count(&db), 0);
    }

    #[test]
    fn tables_are_stored_once_each_as_tsv() {
        let mut db = Database::open_in_memory().unwrap();
        let table: Table = vec![strings(&["a", "b"]), strings(&["1", "2"])];
        db.store_extracted_tables("t.pdf", &[table.clone(), table])
            .unwrap();
        let tables = db.get_tables_for_file("t.pdf").unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].content, "a\tb\n1\t2");
    }

    #[test]
    fn entities_join_through_processed_texts() {
        let mut db = Database::open_in_memory().unwrap();
        db.store_file_with_chunks("e.pdf", &strings(&["raw"])).unwrap();
        db.store_processed_text("e.pdf", &strings(&["paid $5 in 1999"]))
            .unwrap();
        let pt = db.get_processed_texts("e.pdf").unwrap();
        let mentions = vec![EntityMention {
            text: "1999".into(),
            label: "DATE".into(),
        }];
        db.store_entities(pt[0].id, &mentions).unwrap();

        let found = db.get_entities_by_file("e.pdf").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_label, "DATE");
        assert_eq!(found[0].chunk_id, pt[0].id);
        assert!(db.get_entities_by_file("other.pdf").unwrap().is_empty());
    }

    #[test]
    fn topics_are_replaced_on_rerun() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_topics("t.pdf", &strings(&["a", "b"])).unwrap();
        db.replace_topics("t.pdf", &strings(&["c"])).unwrap();
        let topics = db.get_topics_by_file("t.pdf").unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic, "c");
    }

    #[test]
    fn embeddings_round_trip_through_blob() {
        let mut db = Database::open_in_memory().unwrap();
        let records = vec![
            EmbeddingRecord {
                file_name: "v.pdf".into(),
                chunk_index: 1,
                vector: vec![0.5, -1.0],
            },
            EmbeddingRecord {
                file_name: "v.pdf".into(),
                chunk_index: 0,
                vector: vec![0.25, 2.0],
            },
        ];
        db.replace_embeddings("v.pdf", &records).unwrap();
        let loaded = db.get_embeddings_by_file("v.pdf").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].chunk_index, 0);
        assert_eq!(loaded[0].vector, vec![0.25, 2.0]);
        assert_eq!(loaded[1].vector, vec![0.5, -1.0]);
    }

    #[test]
    fn clusters_replace_and_stats() {
        let mut db = Database::open_in_memory().unwrap();
        db.store_file_with_chunks("s.pdf", &strings(&["x", "y"])).unwrap();
        let assignments: Vec<_> = (0..3)
            .map(|i| ClusterAssignment {
                file_name: "s.pdf".into(),
                chunk_index: i,
                cluster_label: i % 2,
            })
            .collect();
        db.replace_clusters("s.pdf", &assignments).unwrap();
        db.replace_clusters("s.pdf", &assignments[..2]).unwrap();
        assert_eq!(db.get_clusters_by_file("s.pdf").unwrap().len(), 2);

        let stats = db.file_stats("s.pdf").unwrap();
        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.clusters, 2);
        assert_eq!(stats.topics, 0);
    }
}
