use crate::models::ChunkMeta;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DIET_KEYWORDS: [&str; 8] = [
    "vegan",
    "vegetarian",
    "gluten-free",
    "gluten free",
    "dairy-free",
    "dairy free",
    "keto",
    "paleo",
];

const MEAL_KEYWORDS: [&str; 6] = ["breakfast", "brunch", "lunch", "dinner", "snack", "dessert"];

/// Filters inferred from the wording of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoFilters {
    pub max_minutes: Option<i64>,
    pub diet: Option<String>,
    pub meal: Option<String>,
}

impl AutoFilters {
    /// Extract a time ceiling, a diet and a meal from `query`.
    ///
    /// Only the first keyword per category (in priority order) is kept.
    pub fn from_query(query: &str) -> Self {
        let lower = query.to_lowercase();

        static BOUNDED: OnceLock<Regex> = OnceLock::new();
        static BARE: OnceLock<Regex> = OnceLock::new();
        let bounded = BOUNDED.get_or_init(|| {
            Regex::new(r"(?:under|less than|<)\s*(\d+)\s*(?:min|minutes?)").unwrap()
        });
        let bare = BARE.get_or_init(|| Regex::new(r"\b(\d+)\s*(?:min|minutes?)\b").unwrap());

        let max_minutes = [bounded, bare]
            .into_iter()
            .find_map(|re| re.captures_iter(&lower).find_map(|caps| caps[1].parse().ok()));

        let diet = DIET_KEYWORDS
            .iter()
            .find(|diet| lower.contains(*diet))
            .map(|diet| diet.replace(' ', "-"));

        let meal = MEAL_KEYWORDS
            .iter()
            .find(|meal| lower.contains(*meal))
            .map(|meal| meal.to_string());

        Self {
            max_minutes,
            diet,
            meal,
        }
    }
}

/// Structured constraints applied to retrieved chunks. Unset fields never
/// exclude anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    pub max_minutes: Option<i64>,
    pub diet: Option<String>,
    pub meal: Option<String>,
    pub exclude_allergen: Option<String>,
    /// Comma-separated banned ingredient substrings
    pub exclude_ingredients: Option<String>,
}

impl QueryFilters {
    /// Fill unset fields from `auto`; explicit values always win.
    pub fn with_auto(mut self, auto: AutoFilters) -> Self {
        if self.max_minutes.is_none() {
            self.max_minutes = auto.max_minutes;
        }
        if self.diet.is_none() {
            self.diet = auto.diet;
        }
        if self.meal.is_none() {
            self.meal = auto.meal;
        }
        self
    }

    /// Normalize the filters once so they can be checked per candidate.
    pub fn compile(&self) -> ActiveFilters {
        let lowered = |value: &Option<String>| value.as_deref().unwrap_or("").trim().to_lowercase();

        ActiveFilters {
            max_minutes: self.max_minutes,
            diet: lowered(&self.diet),
            meal: lowered(&self.meal),
            exclude_allergen: lowered(&self.exclude_allergen),
            exclude_ingredients: self
                .exclude_ingredients
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }

    pub fn passes(&self, meta: &ChunkMeta) -> bool {
        self.compile().passes(meta)
    }
}

/// Lower-cased form of [`QueryFilters`]; empty strings mean "unset".
#[derive(Debug, Clone, Default)]
pub struct ActiveFilters {
    max_minutes: Option<i64>,
    diet: String,
    meal: String,
    exclude_allergen: String,
    exclude_ingredients: Vec<String>,
}

impl ActiveFilters {
    /// All active filters must pass.
    pub fn passes(&self, meta: &ChunkMeta) -> bool {
        if let (Some(bound), Some(minutes)) = (self.max_minutes, meta.minutes.as_ref()) {
            // Non-numeric minutes get the benefit of the doubt.
            if minutes.as_f64().is_some_and(|m| m > bound as f64) {
                return false;
            }
        }
        if !self.diet.is_empty() && !has_substr(&meta.diets, &self.diet) {
            return false;
        }
        if !self.meal.is_empty() && !has_substr(&meta.meals, &self.meal) {
            return false;
        }
        if !self.exclude_allergen.is_empty() && has_substr(&meta.allergens, &self.exclude_allergen) {
            return false;
        }
        if !self.exclude_ingredients.is_empty() {
            let ingredients = meta
                .ingredients
                .iter()
                .map(|i| i.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            if self.exclude_ingredients.iter().any(|banned| ingredients.contains(banned.as_str())) {
                return false;
            }
        }
        true
    }
}

fn has_substr(list: &[String], needle: &str) -> bool {
    list.iter().any(|item| item.to_lowercase().contains(needle))
}
