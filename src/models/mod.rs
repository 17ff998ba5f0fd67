pub mod chunk;
pub mod recipe;

pub use chunk::{Chunk, ChunkMeta, ChunkMetadata};
pub use recipe::{DietFlags, Nutrition, RecipeDocument, RecipeMetadata, SourceRef};

use serde::{Deserialize, Deserializer};

/// Deserialize a list field, treating `null` or a non-list as empty.
pub(crate) fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Deserialize an optional number, treating anything non-numeric as absent.
pub(crate) fn lenient_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<serde_json::Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(n),
        _ => None,
    })
}
