use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBED_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI-compatible `/embeddings` endpoint
    Http,
    /// Deterministic offline feature hashing
    Hashing,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "http" | "openai" => Ok(EmbeddingProvider::Http),
            "hashing" | "hash" => Ok(EmbeddingProvider::Hashing),
            other => Err(Error::Config(format!(
                "Unknown EMBED_PROVIDER '{other}' (expected http or hashing)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub dimensions: Option<usize>,
    pub batch_size: usize,
    pub timeout_seconds: u64,
    pub max_retries: usize,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let provider = std::env::var("EMBED_PROVIDER")
            .unwrap_or_else(|_| "http".to_string())
            .parse()?;

        let dimensions = match std::env::var("EMBED_DIM") {
            Ok(value) => Some(
                value
                    .parse()
                    .map_err(|_| Error::Config("Invalid EMBED_DIM value".to_string()))?,
            ),
            Err(_) => None,
        };

        let model = match std::env::var("EMBED_MODEL") {
            Ok(model) => model,
            Err(_) if provider == EmbeddingProvider::Hashing => crate::embedding::hashing_model_id(
                dimensions.unwrap_or(crate::embedding::DEFAULT_HASHING_DIM),
            ),
            Err(_) => DEFAULT_EMBED_MODEL.to_string(),
        };

        let base_url = std::env::var("EMBED_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/v1".to_string());

        let api_key = std::env::var("EMBED_API_KEY").ok().filter(|k| !k.trim().is_empty());

        let batch_size = std::env::var("EMBED_BATCH_SIZE")
            .unwrap_or_else(|_| "128".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_BATCH_SIZE value".to_string()))?;

        let timeout_seconds = std::env::var("EMBED_TIMEOUT")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_TIMEOUT value".to_string()))?;

        let max_retries = std::env::var("EMBED_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_MAX_RETRIES value".to_string()))?;

        Ok(Settings {
            embedding: EmbeddingConfig {
                provider,
                model,
                base_url,
                api_key,
                dimensions,
                batch_size,
                timeout_seconds,
                max_retries,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.embedding.model.trim().is_empty() {
            return Err(Error::Config("EMBED_MODEL must not be empty".to_string()));
        }

        if self.embedding.batch_size == 0 {
            return Err(Error::Config("Batch size must be non-zero".to_string()));
        }

        if self.embedding.dimensions == Some(0) {
            return Err(Error::Config("Embedding dimension must be non-zero".to_string()));
        }

        if self.embedding.max_retries == 0 {
            return Err(Error::Config("EMBED_MAX_RETRIES must be at least 1".to_string()));
        }

        Ok(())
    }
}
