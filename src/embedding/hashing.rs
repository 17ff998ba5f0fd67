use super::{hashing_model_id, l2_normalize, Embedder};
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Offline embedder based on signed feature hashing of lower-cased words.
///
/// Deterministic across runs and machines, so an index built with it can be
/// queried later without any external service.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self::with_model_id(dim, &hashing_model_id(dim))
    }

    pub fn with_model_id(dim: usize, model_id: &str) -> Self {
        Self {
            dim,
            model_id: model_id.to_string(),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) % self.dim as u64;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket as usize] += sign;
        }
        l2_normalize(&mut vector);
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.dim == 0 {
            return Err(Error::Embedding("hashing dimension must be non-zero".to_string()));
        }
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
