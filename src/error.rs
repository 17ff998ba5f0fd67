use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    #[error("Sidecar mismatch: {0}")]
    SidecarMismatch(String),

    #[error("Embedding mismatch: {0}")]
    EmbeddingMismatch(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    pub fn log_safe(&self) -> String {
        match self {
            // Request errors can echo the endpoint URL and headers
            Error::Http(_) => "Embedding HTTP request failed".to_string(),

            Error::Embedding(msg) | Error::Config(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("key") || lower.contains("token") || lower.contains("secret") {
                    "Embedding backend error (details redacted)".to_string()
                } else {
                    self.to_string()
                }
            }

            Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::Validation(_)
            | Error::NotFound(_)
            | Error::EmptyCorpus(_)
            | Error::SidecarMismatch(_)
            | Error::EmbeddingMismatch(_)
            | Error::Index(_) => self.to_string(),
        }
    }
}
