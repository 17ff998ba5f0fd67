//! Word-window chunking of document text.

use crate::models::{Chunk, RecipeDocument};
use tracing::debug;

/// Configuration for word-window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Words per window
    pub max_tokens: usize,
    /// Words shared by consecutive windows
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 400,
            overlap: 80,
        }
    }
}

impl ChunkingConfig {
    /// Step between window starts. Falls back to `max_tokens` when the
    /// overlap would stall or reverse progress.
    pub fn stride(&self) -> usize {
        if self.max_tokens > self.overlap {
            self.max_tokens - self.overlap
        } else {
            self.max_tokens.max(1)
        }
    }
}

/// Split `text` into windows of at most `max_tokens` whitespace-separated words.
///
/// Always returns at least one element: text with no words comes back
/// unchanged as the single chunk.
pub fn chunk_text(text: &str, max_tokens: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![text.to_string()];
    }

    let config = ChunkingConfig { max_tokens, overlap };
    let size = max_tokens.max(1);
    let stride = config.stride();

    let mut chunks = Vec::with_capacity(words.len() / stride + 1);
    let mut start = 0;
    while start < words.len() {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += stride;
    }

    chunks
}

/// Chunk a document, attaching the narrowed metadata to every window.
pub fn chunk_document(doc: &RecipeDocument, config: &ChunkingConfig) -> Vec<Chunk> {
    let windows = chunk_text(&doc.text, config.max_tokens, config.overlap);

    debug!(
        doc_id = %doc.id,
        chunk_count = windows.len(),
        max_tokens = config.max_tokens,
        "Document chunked"
    );

    windows
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::from_document(doc, index, text))
        .collect()
}
