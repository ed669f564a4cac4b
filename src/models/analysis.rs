use serde::Serialize;

/// A recognised entity span before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityMention {
    pub text: String,
    pub label: String,
}

/// A stored entity mention, linked to the processed text it was found in.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRecord {
    pub id: i64,
    pub entity_text: String,
    pub entity_label: String,
    /// Row ID in `processed_texts`.
    pub chunk_id: i64,
}

/// A topic summary string for a file.
#[derive(Debug, Clone, Serialize)]
pub struct TopicRecord {
    pub file_name: String,
    pub topic: String,
}

/// A dense vector for one processed chunk of a file.
///
/// `chunk_index` is the position of the chunk in the batch the vector was
/// generated from, not a `processed_texts` row ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingRecord {
    pub file_name: String,
    pub chunk_index: i64,
    pub vector: Vec<f32>,
}

impl EmbeddingRecord {
    /// Encode the vector as little-endian `f32` bytes.
    #[must_use]
    pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
        vector.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Decode little-endian `f32` bytes. Trailing bytes that do not form a full value are ignored.
    #[must_use]
    pub fn decode_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

/// A k-means label for one embedded chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    pub file_name: String,
    /// Same batch-local index as [`EmbeddingRecord::chunk_index`].
    pub chunk_index: i64,
    pub cluster_label: i64,
}
