// Normalize raw recipe rows into documents and word-window chunks

pub mod chunker;
pub mod literal;
pub mod normalizer;
pub mod source;

pub use chunker::{chunk_document, chunk_text, ChunkingConfig};
pub use normalizer::{Normalizer, RawRow};
pub use source::read_rows;

use crate::error::{Error, Result};
use crate::utils::jsonl;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const RECIPES_FILE: &str = "recipes.jsonl";
pub const CHUNKS_FILE: &str = "chunks.jsonl";

#[derive(Debug, Clone)]
pub struct NormalizeReport {
    pub recipes_path: PathBuf,
    pub chunks_path: PathBuf,
    pub recipe_count: usize,
    pub chunk_count: usize,
}

/// Normalize every row of `csv_path` and write `recipes.jsonl` plus
/// `chunks.jsonl` into `out_dir`.
pub fn run_normalize(
    csv_path: &Path,
    out_dir: &Path,
    chunking: &ChunkingConfig,
    limit: Option<usize>,
) -> Result<NormalizeReport> {
    if chunking.max_tokens == 0 {
        return Err(Error::Validation("--chunk-tokens must be at least 1".to_string()));
    }

    let rows = read_rows(csv_path, limit)?;

    let dataset = csv_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(normalizer::DEFAULT_DATASET);
    let normalizer = Normalizer::new(dataset);

    fs::create_dir_all(out_dir)?;
    let recipes_path = out_dir.join(RECIPES_FILE);
    let chunks_path = out_dir.join(CHUNKS_FILE);

    let mut recipes_out = BufWriter::new(File::create(&recipes_path)?);
    let mut chunks_out = BufWriter::new(File::create(&chunks_path)?);

    let mut chunk_count = 0;
    for (row_index, row) in rows.iter().enumerate() {
        let doc = normalizer.normalize(row, row_index);
        jsonl::write_line(&mut recipes_out, &doc)?;

        for chunk in chunk_document(&doc, chunking) {
            jsonl::write_line(&mut chunks_out, &chunk)?;
            chunk_count += 1;
        }
    }

    recipes_out.flush()?;
    chunks_out.flush()?;

    info!(
        "Normalized {} recipes into {} chunks (window {}, overlap {})",
        rows.len(),
        chunk_count,
        chunking.max_tokens,
        chunking.overlap
    );

    Ok(NormalizeReport {
        recipes_path: fs::canonicalize(&recipes_path)?,
        chunks_path: fs::canonicalize(&chunks_path)?,
        recipe_count: rows.len(),
        chunk_count,
    })
}
