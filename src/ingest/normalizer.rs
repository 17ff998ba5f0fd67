use crate::ingest::literal::parse_list_literal;
use crate::models::{DietFlags, Nutrition, RecipeDocument, RecipeMetadata, SourceRef};
use serde_json::{Map, Value};
use tracing::debug;

/// One untyped input row keyed by column name.
pub type RawRow = Map<String, Value>;

pub const UNNAMED_RECIPE: &str = "(Unnamed Recipe)";
pub const DEFAULT_DATASET: &str = "updated_combined_data_categories_embedded.csv";

/// Turns raw rows into [`RecipeDocument`]s.
///
/// Normalization never fails: every field falls back to a blank string,
/// `None`, or an empty list when the source cell is missing or malformed.
#[derive(Debug, Clone)]
pub struct Normalizer {
    dataset: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET)
    }
}

impl Normalizer {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    pub fn normalize(&self, row: &RawRow, row_index: usize) -> RecipeDocument {
        let mut id = cell_str(row.get("id")).trim().to_string();
        if id.is_empty() {
            id = uuid::Uuid::new_v4().to_string();
            debug!(row_index, "Row has no id, generated {}", id);
        }

        let title = non_blank(row.get("name")).unwrap_or_else(|| UNNAMED_RECIPE.to_string());

        let minutes = to_int(row.get("minutes"));
        let servings = to_int(row.get("servings"));
        let serving_size = non_blank(row.get("serving_size"));

        let ingredients = as_list(row.get("ingredients_raw_str"));
        let steps = as_list(row.get("steps"));
        let tags = as_list(row.get("tags"));
        let diets = as_list(row.get("diets"));
        let allergens = as_list(row.get("allergens"));
        let meals = as_list(row.get("meals"));
        let cuisine = non_blank(row.get("cuisine"));

        let nutrition = Nutrition {
            calories: to_float(row.get("calories")),
            total_fat_pdv: to_float(row.get("total_fat_pdv")),
            sugar_pdv: to_float(row.get("sugar_pdv")),
            sodium_pdv: to_float(row.get("sodium_pdv")),
            protein_pdv: to_float(row.get("protein_pdv")),
            saturated_fat_pdv: to_float(row.get("saturated_fat_pdv")),
            carbohydrates_pdv: to_float(row.get("carbohydrates_pdv")),
        };

        let diet_flags = diet_flags(&diets, &tags, &allergens);

        let text = match non_blank(row.get("combined_text")) {
            Some(combined) => combined,
            None => synthesize_text(&title, &ingredients, &steps, cuisine.as_deref(), &diets, &tags),
        };

        RecipeDocument {
            id,
            title,
            text,
            metadata: RecipeMetadata {
                minutes,
                servings,
                serving_size,
                ingredients,
                steps,
                tags,
                diets,
                allergens,
                meals,
                cuisine,
                nutrition,
                diet_flags,
                source: SourceRef {
                    dataset: self.dataset.clone(),
                    row_index,
                },
            },
        }
    }
}

/// Substring heuristics over diets, tags and allergens.
///
/// `is_dairy_free` is also true when the allergens simply never mention
/// dairy.
pub fn diet_flags(diets: &[String], tags: &[String], allergens: &[String]) -> DietFlags {
    DietFlags {
        is_vegan: contains(diets, "vegan"),
        is_vegetarian: contains(diets, "vegetarian"),
        is_gluten_free: contains(diets, "gluten") || contains(tags, "gluten-free"),
        is_dairy_free: contains(diets, "dairy-free") || !contains(allergens, "dairy"),
    }
}

fn contains(list: &[String], key: &str) -> bool {
    let key = key.to_lowercase();
    list.iter().any(|item| item.to_lowercase().contains(&key))
}

/// Deterministic embeddable text for rows without a precomputed one.
pub fn synthesize_text(
    title: &str,
    ingredients: &[String],
    steps: &[String],
    cuisine: Option<&str>,
    diets: &[String],
    tags: &[String],
) -> String {
    let ingredients = ingredients.join(", ");
    let steps_block = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("Step {}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join(" ");
    let meta_line = cuisine
        .into_iter()
        .chain(diets.iter().map(String::as_str))
        .chain(tags.iter().map(String::as_str))
        .filter(|bit| !bit.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    format!("{title}\nIngredients: {ingredients}\n{steps_block}\nMeta: {meta_line}")
        .trim()
        .to_string()
}

/// Coerce a cell into a list of non-empty trimmed strings.
///
/// Order matters: a list literal is tried before comma splitting because
/// literals such as `['salt, to taste']` contain commas themselves.
pub fn as_list(value: Option<&Value>) -> Vec<String> {
    let raw = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => {
            return clean(items.iter().map(|item| cell_str(Some(item))));
        }
        Some(other) => cell_str(Some(other)),
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_list_literal(raw) {
        return clean(items.into_iter());
    }

    clean(raw.split(',').map(str::to_string))
}

fn clean(items: impl Iterator<Item = String>) -> Vec<String> {
    items
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn cell_str(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    let s = cell_str(value);
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Integer coercion; floats truncate toward zero, NaN and junk are absent.
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| finite(n.as_f64()?).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| finite(s.parse::<f64>().ok()?).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Float coercion; non-finite values are absent.
pub fn to_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => finite(n.as_f64()?),
        Value::String(s) => finite(s.trim().parse::<f64>().ok()?),
        _ => None,
    }
}

fn finite(f: f64) -> Option<f64> {
    f.is_finite().then_some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixture must be an object"),
        }
    }

    #[test]
    fn test_blank_row_fallbacks() {
        let doc = Normalizer::default().normalize(
            &row(json!({"name": "", "minutes": "NaN", "ingredients_raw_str": "a, b, c"})),
            0,
        );

        assert_eq!(doc.title, UNNAMED_RECIPE);
        assert_eq!(doc.metadata.minutes, None);
        assert_eq!(doc.metadata.ingredients, vec!["a", "b", "c"]);
        assert!(uuid::Uuid::parse_str(&doc.id).is_ok());
        assert_eq!(doc.metadata.source.row_index, 0);
    }

    #[test]
    fn test_list_literal_before_comma_split() {
        let value = json!("['salt, to taste', ' pepper ', '']");
        assert_eq!(as_list(Some(&value)), vec!["salt, to taste", "pepper"]);

        let value = json!("[a, b]");
        assert_eq!(as_list(Some(&value)), vec!["[a", "b]"]);

        let value = json!(["x", " ", 3]);
        assert_eq!(as_list(Some(&value)), vec!["x", "3"]);

        assert!(as_list(Some(&json!("  "))).is_empty());
        assert!(as_list(None).is_empty());
        assert_eq!(as_list(Some(&json!("single"))), vec!["single"]);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(to_int(Some(&json!(30))), Some(30));
        assert_eq!(to_int(Some(&json!(30.9))), Some(30));
        assert_eq!(to_int(Some(&json!(" 45 "))), Some(45));
        assert_eq!(to_int(Some(&json!("12.0"))), Some(12));
        assert_eq!(to_int(Some(&json!("soon"))), None);
        assert_eq!(to_int(Some(&json!("inf"))), None);
        assert_eq!(to_int(Some(&Value::Null)), None);

        assert_eq!(to_float(Some(&json!("51.5"))), Some(51.5));
        assert_eq!(to_float(Some(&json!("nan"))), None);
        assert_eq!(to_float(Some(&json!(true))), None);
    }

    #[test]
    fn test_diet_flags_asymmetry() {
        let s = |items: &[&str]| items.iter().map(|i| i.to_string()).collect::<Vec<_>>();

        let flags = diet_flags(&s(&["Vegan"]), &[], &[]);
        assert!(flags.is_vegan);
        assert!(!flags.is_vegetarian);
        assert!(!flags.is_gluten_free);
        assert!(flags.is_dairy_free, "no dairy allergen means dairy-free");

        let flags = diet_flags(&[], &s(&["Gluten-Free"]), &s(&["Dairy", "nuts"]));
        assert!(flags.is_gluten_free);
        assert!(!flags.is_dairy_free);

        let flags = diet_flags(&s(&["dairy-free"]), &[], &s(&["dairy"]));
        assert!(flags.is_dairy_free);
    }

    #[test]
    fn test_synthesized_text() {
        let doc = Normalizer::default().normalize(
            &row(json!({
                "id": " 42 ",
                "name": "Tomato Soup",
                "ingredients_raw_str": "['tomatoes', 'salt']",
                "steps": "['Chop.', 'Simmer.']",
                "cuisine": "italian",
                "diets": "vegan",
                "tags": "['soup', '']",
            })),
            3,
        );

        assert_eq!(doc.id, "42");
        assert_eq!(
            doc.text,
            "Tomato Soup\nIngredients: tomatoes, salt\nStep 1. Chop. Step 2. Simmer.\nMeta: italian, vegan, soup"
        );
    }

    #[test]
    fn test_synthesized_text_without_steps() {
        let text = synthesize_text("Toast", &[], &[], None, &[], &[]);
        assert_eq!(text, "Toast\nIngredients: \n\nMeta:");
    }

    #[test]
    fn test_combined_text_used_verbatim() {
        let doc = Normalizer::new("recipes.csv").normalize(
            &row(json!({"name": "Pie", "combined_text": "  Pie with apples  "})),
            1,
        );
        assert_eq!(doc.text, "Pie with apples");
        assert_eq!(doc.metadata.source.dataset, "recipes.csv");
    }

    #[test]
    fn test_normalize_is_deterministic_with_id() {
        let input = row(json!({"id": "r-1", "name": "Stew", "minutes": 60, "tags": "a,b"}));
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize(&input, 7), normalizer.normalize(&input, 7));
    }
}
