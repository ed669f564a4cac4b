/// Ordered schema migrations. Step `n` (1-based) brings `PRAGMA user_version` to `n`.
pub const MIGRATIONS: &[&str] = &[
    // 1: files and their raw text chunks
    r"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    file_name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS text_chunks (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    chunk_content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_text_chunks_file_id ON text_chunks(file_id, position);
",
    // 2: NLP output and extracted tables
    r"
CREATE TABLE IF NOT EXISTS processed_texts (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    content TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS extracted_tables (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_processed_texts_file_id ON processed_texts(file_id);
CREATE INDEX IF NOT EXISTS idx_extracted_tables_file_id ON extracted_tables(file_id);
",
    // 3: entity mentions
    r"
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY,
    entity_text TEXT NOT NULL,
    entity_label TEXT NOT NULL,
    chunk_id INTEGER NOT NULL REFERENCES processed_texts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_entities_chunk_id ON entities(chunk_id);
",
    // 4: file-scoped analysis results, keyed by name
    // chunk_index is a batch-local position, deliberately not a foreign key.
    r"
CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY,
    file_name TEXT NOT NULL,
    topic TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS embeddings (
    id INTEGER PRIMARY KEY,
    file_name TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    embedding BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS clusters (
    id INTEGER PRIMARY KEY,
    file_name TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    cluster_label INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_topics_file_name ON topics(file_name);
CREATE INDEX IF NOT EXISTS idx_embeddings_file_name ON embeddings(file_name, chunk_index);
CREATE INDEX IF NOT EXISTS idx_clusters_file_name ON clusters(file_name, chunk_index);
",
];

/// Schema version after all migrations have run.
#[must_use]
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn migrations_apply_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        for step in MIGRATIONS {
            conn.execute_batch(step).unwrap();
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        for step in MIGRATIONS {
            conn.execute_batch(step).unwrap();
            conn.execute_batch(step).unwrap();
        }
    }

    #[test]
    fn latest_version_counts_steps() {
        assert_eq!(latest_version(), 4);
    }
}
