use super::{lenient_list, lenient_number, RecipeDocument};
use serde::{Deserialize, Serialize};

/// One word window of a recipe document, written to `chunks.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub recipe_title: String,
    pub chunk_index: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// The subset of recipe metadata carried at chunk granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub minutes: Option<i64>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub cuisine: Option<String>,
    #[serde(default)]
    pub meals: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl Chunk {
    pub fn chunk_id_for(doc_id: &str, chunk_index: usize) -> String {
        format!("{doc_id}:{chunk_index}")
    }

    /// Build the chunk at `chunk_index` of `doc` holding `text`.
    pub fn from_document(doc: &RecipeDocument, chunk_index: usize, text: String) -> Self {
        let meta = &doc.metadata;
        Self {
            chunk_id: Self::chunk_id_for(&doc.id, chunk_index),
            doc_id: doc.id.clone(),
            recipe_title: doc.title.clone(),
            chunk_index,
            text,
            metadata: ChunkMetadata {
                minutes: meta.minutes,
                diets: meta.diets.clone(),
                allergens: meta.allergens.clone(),
                cuisine: meta.cuisine.clone(),
                meals: meta.meals.clone(),
                ingredients: meta.ingredients.clone(),
            },
        }
    }
}

/// Flattened metadata sidecar record, one line of `metas.jsonl` per vector.
///
/// Reading is lenient: a missing list is empty and a non-numeric `minutes`
/// is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    #[serde(default)]
    pub chunk_id: String,
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub recipe_title: String,
    #[serde(default)]
    pub chunk_index: usize,
    #[serde(default, deserialize_with = "lenient_number")]
    pub minutes: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub diets: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub meals: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ingredients: Vec<String>,
}

impl From<&Chunk> for ChunkMeta {
    fn from(chunk: &Chunk) -> Self {
        let meta = &chunk.metadata;
        Self {
            chunk_id: chunk.chunk_id.clone(),
            doc_id: chunk.doc_id.clone(),
            recipe_title: chunk.recipe_title.clone(),
            chunk_index: chunk.chunk_index,
            minutes: meta.minutes.map(serde_json::Number::from),
            diets: meta.diets.clone(),
            allergens: meta.allergens.clone(),
            cuisine: meta.cuisine.clone(),
            meals: meta.meals.clone(),
            ingredients: meta.ingredients.clone(),
        }
    }
}
