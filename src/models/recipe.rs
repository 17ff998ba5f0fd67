use serde::{Deserialize, Serialize};

/// Canonical recipe document written to `recipes.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub id: String,
    pub title: String,
    /// Exact content handed to the embedder.
    pub text: String,
    pub metadata: RecipeMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    pub minutes: Option<i64>,
    pub servings: Option<i64>,
    pub serving_size: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub meals: Vec<String>,
    pub cuisine: Option<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub diet_flags: DietFlags,
    #[serde(default)]
    pub source: SourceRef,
}

/// Per-recipe nutrition facts; `*_pdv` values are percent of daily value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub total_fat_pdv: Option<f64>,
    pub sugar_pdv: Option<f64>,
    pub sodium_pdv: Option<f64>,
    pub protein_pdv: Option<f64>,
    pub saturated_fat_pdv: Option<f64>,
    pub carbohydrates_pdv: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietFlags {
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_gluten_free: bool,
    pub is_dairy_free: bool,
}

/// Provenance of a document: dataset file and zero-based row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub dataset: String,
    pub row_index: usize,
}
