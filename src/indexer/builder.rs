use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::indexer::artifacts::{
    Manifest, INDEX_FILE, MANIFEST_FILE, METAS_FILE, METRIC_INNER_PRODUCT, TEXTS_FILE,
};
use crate::indexer::flat::FlatIpIndex;
use crate::models::{Chunk, ChunkMeta};
use crate::utils::jsonl;
use serde_json::json;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

/// Build the index and sidecars for every chunk in `chunks_path`.
///
/// Precondition: no other build targets `out_dir` at the same time. The
/// artifacts are only consistent as a set, and concurrent writers can
/// interleave them.
pub fn build_index(chunks_path: &Path, out_dir: &Path, embedder: &dyn Embedder) -> Result<BuildReport> {
    if !chunks_path.is_file() {
        return Err(Error::NotFound(format!(
            "chunks file not found: {}",
            chunks_path.display()
        )));
    }
    let chunks: Vec<Chunk> = jsonl::read_all(chunks_path)?;
    build_from_chunks(&chunks, out_dir, embedder)
}

pub fn build_from_chunks(chunks: &[Chunk], out_dir: &Path, embedder: &dyn Embedder) -> Result<BuildReport> {
    if chunks.is_empty() {
        return Err(Error::EmptyCorpus("No records found in chunks.jsonl".to_string()));
    }

    let mut seen = HashSet::with_capacity(chunks.len());
    if let Some(repeated) = chunks.iter().find(|c| !seen.insert(c.chunk_id.as_str())) {
        return Err(Error::Validation(format!(
            "chunk_id '{}' appears more than once; recipe ids must be unique",
            repeated.chunk_id
        )));
    }

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    info!("Embedding {} chunks with {}", texts.len(), embedder.model_id());
    let vectors = embedder.embed(&texts)?;
    if vectors.len() != chunks.len() {
        return Err(Error::Embedding(format!(
            "embedder returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        )));
    }

    let labels = chunks.iter().map(|c| c.chunk_id.clone()).collect();
    let index = FlatIpIndex::build(&vectors, labels)?;
    let dim = vectors[0].len();
    debug!(dim, count = chunks.len(), "Index built");

    fs::create_dir_all(out_dir)?;
    let out_dir = fs::canonicalize(out_dir)?;
    let index_path = out_dir.join(INDEX_FILE);
    let texts_path = out_dir.join(TEXTS_FILE);
    let metas_path = out_dir.join(METAS_FILE);
    let manifest_path = out_dir.join(MANIFEST_FILE);

    // Without a manifest the directory is unusable, so drop it before any
    // other artifact changes and restore it last.
    if manifest_path.exists() {
        fs::remove_file(&manifest_path)?;
    }

    let staged_index = staging_path(&index_path);
    index.save(&staged_index)?;

    let staged_texts = staging_path(&texts_path);
    let mut out = BufWriter::new(File::create(&staged_texts)?);
    for chunk in chunks {
        jsonl::write_line(&mut out, &json!({ "text": chunk.text }))?;
    }
    out.flush()?;

    let staged_metas = staging_path(&metas_path);
    let mut out = BufWriter::new(File::create(&staged_metas)?);
    for chunk in chunks {
        jsonl::write_line(&mut out, &ChunkMeta::from(chunk))?;
    }
    out.flush()?;

    let manifest = Manifest {
        embed_model: embedder.model_id().to_string(),
        dim,
        count: chunks.len(),
        metric: METRIC_INNER_PRODUCT.to_string(),
        normalized: true,
        index_path: index_path.clone(),
        texts_path: texts_path.clone(),
        metas_path: metas_path.clone(),
    };
    let staged_manifest = staging_path(&manifest_path);
    fs::write(&staged_manifest, serde_json::to_string_pretty(&manifest)?)?;

    fs::rename(&staged_index, &index_path)?;
    fs::rename(&staged_texts, &texts_path)?;
    fs::rename(&staged_metas, &metas_path)?;
    fs::rename(&staged_manifest, &manifest_path)?;

    info!(
        "Built index of {} vectors ({} dims) in {}",
        manifest.count,
        manifest.dim,
        out_dir.display()
    );

    Ok(BuildReport {
        manifest,
        manifest_path,
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
