use crate::error::{Error, Result};
use crate::indexer::flat::{FlatIpIndex, VectorIndex};
use crate::models::ChunkMeta;
use crate::utils::jsonl;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const INDEX_FILE: &str = "recipes_chunks.index";
pub const TEXTS_FILE: &str = "texts.jsonl";
pub const METAS_FILE: &str = "metas.jsonl";
pub const MANIFEST_FILE: &str = "manifest.json";

pub const METRIC_INNER_PRODUCT: &str = "inner_product";

/// Describes which embedding produced an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub embed_model: String,
    pub dim: usize,
    pub count: usize,
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_normalized")]
    pub normalized: bool,
    pub index_path: PathBuf,
    pub texts_path: PathBuf,
    pub metas_path: PathBuf,
}

fn default_metric() -> String {
    METRIC_INNER_PRODUCT.to_string()
}

fn default_normalized() -> bool {
    true
}

impl Manifest {
    pub fn load(index_dir: &Path) -> Result<Self> {
        let path = index_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(Error::NotFound(format!(
                "{MANIFEST_FILE} not found in {}. Build the index first.",
                index_dir.display()
            )));
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Fail unless vectors from `embed_model` can be searched against this index.
    pub fn ensure_compatible(&self, embed_model: &str) -> Result<()> {
        if self.embed_model != embed_model {
            return Err(Error::EmbeddingMismatch(format!(
                "index was built with '{}' but the configured embedder is '{}'",
                self.embed_model, embed_model
            )));
        }
        if self.metric != METRIC_INNER_PRODUCT || !self.normalized {
            return Err(Error::EmbeddingMismatch(format!(
                "unsupported index metric '{}' (normalized: {})",
                self.metric, self.normalized
            )));
        }
        Ok(())
    }
}

/// A loaded, validated index plus its sidecars.
pub struct ArtifactSet {
    pub manifest: Manifest,
    index: FlatIpIndex,
    texts: Vec<String>,
    metas: Vec<ChunkMeta>,
    /// vector id -> sidecar position
    positions: Vec<usize>,
}

impl ArtifactSet {
    pub fn load(index_dir: &Path) -> Result<Self> {
        let manifest = Manifest::load(index_dir)?;

        let index_path = index_dir.join(INDEX_FILE);
        let texts_path = index_dir.join(TEXTS_FILE);
        let metas_path = index_dir.join(METAS_FILE);

        if !index_path.is_file() {
            return Err(Error::NotFound(format!("index not found: {}", index_path.display())));
        }
        if !texts_path.is_file() || !metas_path.is_file() {
            return Err(Error::NotFound(format!(
                "missing {TEXTS_FILE} or {METAS_FILE} in {}. Rebuild the index.",
                index_dir.display()
            )));
        }

        let index = FlatIpIndex::load(&index_path)?;
        let texts: Vec<String> = jsonl::read_all::<Value>(&texts_path)?
            .into_iter()
            .map(text_from_record)
            .collect();
        let metas: Vec<ChunkMeta> = jsonl::read_all(&metas_path)?;

        if texts.len() != metas.len() {
            return Err(Error::SidecarMismatch(format!(
                "{TEXTS_FILE} has {} records but {METAS_FILE} has {}. Rebuild the index.",
                texts.len(),
                metas.len()
            )));
        }
        if index.len() != metas.len() || manifest.count != metas.len() {
            return Err(Error::SidecarMismatch(format!(
                "index holds {} vectors, manifest count is {}, sidecars hold {}. Rebuild the index.",
                index.len(),
                manifest.count,
                metas.len()
            )));
        }
        if index.dim() != manifest.dim {
            return Err(Error::Index(format!(
                "index dimension {} does not match manifest dimension {}",
                index.dim(),
                manifest.dim
            )));
        }

        let mut by_chunk_id: HashMap<&str, usize> = HashMap::with_capacity(metas.len());
        for (pos, meta) in metas.iter().enumerate() {
            if by_chunk_id.insert(meta.chunk_id.as_str(), pos).is_some() {
                return Err(Error::SidecarMismatch(format!(
                    "duplicate chunk_id '{}' in {METAS_FILE}",
                    meta.chunk_id
                )));
            }
        }

        let mut positions = Vec::with_capacity(index.len());
        for id in 0..index.len() {
            let label = index.label(id).unwrap_or_default();
            let pos = by_chunk_id.get(label).copied().ok_or_else(|| {
                Error::SidecarMismatch(format!("index vector {id} ('{label}') has no sidecar record"))
            })?;
            positions.push(pos);
        }

        info!(
            "Loaded {} vectors ({} dims, model {}) from {}",
            index.len(),
            index.dim(),
            manifest.embed_model,
            index_dir.display()
        );

        Ok(Self {
            manifest,
            index,
            texts,
            metas,
            positions,
        })
    }

    pub fn index(&self) -> &dyn VectorIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// Sidecar text and metadata for a vector id returned by search.
    pub fn resolve(&self, vector_id: i64) -> Option<(&str, &ChunkMeta)> {
        let vector_id = usize::try_from(vector_id).ok()?;
        let pos = *self.positions.get(vector_id)?;
        Some((self.texts[pos].as_str(), &self.metas[pos]))
    }
}

// Accept `{"text": ...}` records as written, or a bare string.
fn text_from_record(record: Value) -> String {
    match record {
        Value::Object(mut map) => match map.remove("text") {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        Value::String(text) => text,
        other => other.to_string(),
    }
}
