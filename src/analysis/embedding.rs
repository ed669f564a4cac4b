use sha2::{Digest, Sha256};

/// Turns a passage of text into a fixed-length vector.
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Feature-hashing sentence embedder.
///
/// Unigrams and adjacent-word bigrams are hashed into signed buckets and the
/// result is L2-normalized, so texts sharing vocabulary have a high cosine
/// similarity. Empty text embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(bytes);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(768)
    }
}

impl Embedder for HashingEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        for word in &words {
            self.add_feature(&mut vector, word, 1.0);
        }
        for pair in words.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn vectors_have_configured_length_and_unit_norm() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed("The quick brown fox");
        assert_eq!(v.len(), 64);
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(16).embed("  ");
        assert_eq!(v, vec![0.0; 16]);
    }

    #[test]
    fn embedding_is_deterministic_and_case_insensitive() {
        let embedder = HashingEmbedder::default();
        assert_eq!(embedder.embed("Cats, dogs!"), embedder.embed("cats dogs"));
    }

    #[test]
    fn related_texts_are_closer() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("stock market prices fell sharply today");
        let b = embedder.embed("stock market prices rose sharply today");
        let c = embedder.embed("the cat slept on a warm blanket");
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }
}
