use super::{l2_normalize, Embedder};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking client for OpenAI-compatible `/embeddings` endpoints.
///
/// Works against hosted APIs as well as local inference servers that expose
/// the same wire format.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
    batch_size: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<&str>,
        dimensions: Option<usize>,
        timeout: Duration,
        max_retries: usize,
        batch_size: usize,
    ) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(Error::Config("missing embedding model name".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let auth = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
                .map_err(|_| Error::Config("invalid EMBED_API_KEY".to_string()))?;
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimensions,
            max_retries: max_retries.max(1),
            batch_size: batch_size.max(1),
        })
    }

    /// Sends one batch and returns vectors in input order.
    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: inputs,
                dimensions: self.dimensions,
            };

            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) if resp.status().is_success() => {
                    let mut parsed: EmbeddingResponse = resp.json()?;
                    parsed.data.sort_by_key(|entry| entry.index);
                    if parsed.data.len() != inputs.len() {
                        return Err(Error::Embedding(format!(
                            "endpoint returned {} embeddings for {} inputs",
                            parsed.data.len(),
                            inputs.len()
                        )));
                    }
                    return Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect());
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!("Embedding request returned {}, retry {}", status, attempt);
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(Error::Embedding(format!(
                        "embedding request failed ({status}): {body}"
                    )));
                }
                Err(err) => {
                    if (err.is_timeout() || err.is_connect()) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!("Embedding request error, retry {}: {}", attempt, err);
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

impl Embedder for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(batch_no, batch_len = batch.len(), "Embedding batch");
            vectors.extend(self.embed_batch(batch)?);
        }

        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        for vector in vectors.iter_mut() {
            if vector.len() != dim {
                return Err(Error::Embedding(format!(
                    "inconsistent embedding dimensions: {} vs {}",
                    vector.len(),
                    dim
                )));
            }
            l2_normalize(vector);
        }
        Ok(vectors)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
