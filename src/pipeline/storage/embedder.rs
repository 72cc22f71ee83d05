use sha2::{Digest, Sha256};

use super::types::EmbeddingModel;
use super::StorageError;

pub const HASH_EMBEDDING_DIM: usize = 384;

/// Offline embedder: signed feature hashing over lowercase word tokens.
///
/// Needs no network and is deterministic, so it doubles as the test
/// embedder. Vectors are L2-normalized.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: HASH_EMBEDDING_DIM,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError> {
        Ok(hashed_vector(text, self.dimension))
    }
}

fn hashed_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dim];

    let tokens = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    for token in tokens {
        let digest = Sha256::digest(token.as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize % dim;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign;
    }

    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in &mut vec {
            *val /= norm;
        }
    }

    vec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_returns_configured_dimension() {
        let embedder = HashEmbedder::new();
        assert_eq!(embedder.embed("Hello world").unwrap().len(), HASH_EMBEDDING_DIM);
        assert_eq!(embedder.dimension(), 384);
    }

    #[test]
    fn embed_is_deterministic_and_case_insensitive() {
        let embedder = HashEmbedder::new();
        let v1 = embedder.embed("Paracetamol 500mg").unwrap();
        let v2 = embedder.embed("paracetamol 500MG").unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn different_texts_differ() {
        let embedder = HashEmbedder::new();
        let v1 = embedder.embed("type 2 diabetes").unwrap();
        let v2 = embedder.embed("seasonal influenza").unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn output_is_l2_normalized() {
        let embedder = HashEmbedder::new();
        let vec = embedder.embed("test normalization of vectors").unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "got norm = {norm}");
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let vec = HashEmbedder::new().embed("  ...  ").unwrap();
        assert!(vec.iter().all(|v| *v == 0.0));
    }
}
