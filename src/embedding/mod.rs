//! Text embedding backends.
//!
//! Every backend returns unit-length vectors so that inner product equals
//! cosine similarity in the index.

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::Result;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_HASHING_DIM: usize = 384;

/// Maps texts to fixed-dimension, unit-normalized vectors.
pub trait Embedder {
    /// Identifier recorded in the manifest and checked at query time.
    fn model_id(&self) -> &str;

    /// Embed `texts`, returning one vector per input in the same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

pub fn hashing_model_id(dim: usize) -> String {
    format!("hashing-{dim}")
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt();
    if norm <= f64::EPSILON {
        return;
    }
    for v in vector.iter_mut() {
        *v = (f64::from(*v) / norm) as f32;
    }
}

/// Build the backend selected by `config`.
pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Http => {
            info!("Using HTTP embedder {} at {}", config.model, config.base_url);
            let embedder = HttpEmbedder::new(
                &config.base_url,
                &config.model,
                config.api_key.as_deref(),
                config.dimensions,
                Duration::from_secs(config.timeout_seconds),
                config.max_retries,
                config.batch_size,
            )?;
            Ok(Box::new(embedder))
        }
        EmbeddingProvider::Hashing => {
            let dim = config.dimensions.unwrap_or(DEFAULT_HASHING_DIM);
            info!("Using hashing embedder ({} dimensions)", dim);
            Ok(Box::new(HashingEmbedder::with_model_id(dim, &config.model)))
        }
    }
}
