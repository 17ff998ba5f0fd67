use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::indexer::ArtifactSet;
use crate::models::ChunkMeta;
use crate::search::filters::{AutoFilters, QueryFilters};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Candidates fetched per requested result, to absorb filtering and
/// per-recipe deduplication.
pub const OVERSAMPLE_FACTOR: usize = 5;

/// One ranked recipe: its best-scoring chunk plus optional full steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResult {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    pub score: f32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Explicit filters merged with those inferred from the query
    pub filters: QueryFilters,
    pub results: Vec<RecipeResult>,
}

/// Embed `query`, search, filter, keep one chunk per recipe and rank.
pub fn retrieve(
    query: &str,
    k: usize,
    filters: QueryFilters,
    artifacts: &ArtifactSet,
    embedder: &dyn Embedder,
) -> Result<Retrieval> {
    artifacts.manifest.ensure_compatible(embedder.model_id())?;

    let filters = filters.with_auto(AutoFilters::from_query(query));
    debug!(?filters, "Effective query filters");

    if k == 0 || artifacts.is_empty() {
        return Ok(Retrieval {
            filters,
            results: Vec::new(),
        });
    }

    let query_vector = embedder
        .embed(&[query])?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("embedder returned no vector for the query".to_string()))?;
    if query_vector.len() != artifacts.manifest.dim {
        return Err(Error::EmbeddingMismatch(format!(
            "query vector has {} dimensions but the index has {}",
            query_vector.len(),
            artifacts.manifest.dim
        )));
    }

    let fetch = k.saturating_mul(OVERSAMPLE_FACTOR).min(artifacts.len());
    let neighbors = artifacts.index().search(&query_vector, fetch);
    let candidates: Vec<RecipeResult> = neighbors
        .into_iter()
        .filter(|n| n.id >= 0)
        .filter_map(|n| {
            let (text, meta) = artifacts.resolve(n.id)?;
            Some(RecipeResult {
                meta: meta.clone(),
                score: n.score,
                text: text.to_string(),
                steps: None,
            })
        })
        .collect();
    let fetched = candidates.len();

    let active = filters.compile();
    let survivors: Vec<RecipeResult> = candidates
        .into_iter()
        .filter(|c| active.passes(&c.meta))
        .collect();
    let filtered = survivors.len();

    let results = rank(dedupe_by_doc(survivors), k);
    debug!(fetched, filtered, returned = results.len(), "Retrieval finished");

    Ok(Retrieval { filters, results })
}

/// Keep the highest-scoring result per `doc_id`, in first-seen order.
///
/// An equal score does not replace the result already kept.
pub fn dedupe_by_doc(results: Vec<RecipeResult>) -> Vec<RecipeResult> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut best: Vec<RecipeResult> = Vec::new();

    for result in results {
        match slots.get(&result.meta.doc_id) {
            Some(&slot) => {
                if result.score > best[slot].score {
                    best[slot] = result;
                }
            }
            None => {
                slots.insert(result.meta.doc_id.clone(), best.len());
                best.push(result);
            }
        }
    }
    best
}

/// Sort by score descending and keep the top `k`. Ties keep their input order.
pub fn rank(mut results: Vec<RecipeResult>, k: usize) -> Vec<RecipeResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(k);
    results
}
