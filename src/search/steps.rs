use crate::search::engine::RecipeResult;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Full step lists keyed by recipe id, loaded from `recipes.jsonl`.
#[derive(Debug, Clone, Default)]
pub struct StepStore {
    steps: HashMap<String, Option<Vec<String>>>,
}

impl StepStore {
    /// Load `path` on a best-effort basis. A missing file or unreadable line
    /// only costs the affected steps.
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot show full steps, {} unavailable: {}", path.display(), e);
                return Self::default();
            }
        };

        let mut store = Self::default();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Stopped reading {} at line {}: {}", path.display(), line_no + 1, e);
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(record) => store.insert_record(&record),
                Err(e) => debug!("Skipping line {} of {}: {}", line_no + 1, path.display(), e),
            }
        }
        store
    }

    fn insert_record(&mut self, record: &Value) {
        let metadata = record.get("metadata");
        let doc_id = [
            record.get("id"),
            record.get("doc_id"),
            metadata.and_then(|m| m.get("doc_id")),
        ]
        .into_iter()
        .flatten()
        .find_map(id_string);

        let steps = metadata
            .and_then(|m| m.get("steps"))
            .and_then(string_list)
            .or_else(|| record.get("steps").and_then(string_list));

        if let Some(doc_id) = doc_id {
            self.steps.insert(doc_id, steps);
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps for `doc_id`, or `None` when unknown or empty.
    pub fn steps_for(&self, doc_id: &str) -> Option<&[String]> {
        self.steps
            .get(doc_id)?
            .as_deref()
            .filter(|steps| !steps.is_empty())
    }

    /// Attach steps to every result that has them.
    pub fn enrich(&self, results: &mut [RecipeResult]) {
        for result in results.iter_mut() {
            result.steps = self.steps_for(&result.meta.doc_id).map(<[String]>::to_vec);
        }
    }
}

// Ids are taken from the first truthy candidate: non-empty strings or
// non-zero numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}
