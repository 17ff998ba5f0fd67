use crate::config::Settings;
use crate::embedding::embedder_from_config;
use crate::indexer::{build_index, ArtifactSet};
use crate::ingest::{run_normalize, ChunkingConfig};
use crate::search::{retrieve, QueryFilters, RecipeResult, StepStore};
use crate::utils::snippet;
use crate::Result;
use std::path::Path;
use tracing::info;

const SNIPPET_CHARS: usize = 260;

/// Normalize a CSV into recipes.jsonl and chunks.jsonl
pub fn normalize(
    csv: &Path,
    out: &Path,
    chunk_tokens: usize,
    overlap: usize,
    limit: usize,
) -> Result<()> {
    let chunking = ChunkingConfig {
        max_tokens: chunk_tokens,
        overlap,
    };
    let limit = (limit > 0).then_some(limit);

    let report = run_normalize(csv, out, &chunking, limit)?;

    println!("[ok] Wrote:");
    println!("  - {}", report.recipes_path.display());
    println!("  - {}", report.chunks_path.display());
    println!(
        "  {} recipes, {} chunks",
        report.recipe_count, report.chunk_count
    );

    Ok(())
}

/// Embed chunks and write the index artifact set
pub fn build(settings: &Settings, chunks: &Path, out: &Path) -> Result<()> {
    let embedder = embedder_from_config(&settings.embedding)?;
    let report = build_index(chunks, out, embedder.as_ref())?;

    let manifest = &report.manifest;
    println!(
        "[ok] Built index ({} vectors, {} dims, {})",
        manifest.count, manifest.dim, manifest.embed_model
    );
    println!(" - {}", manifest.index_path.display());
    println!(" - {}", manifest.texts_path.display());
    println!(" - {}", manifest.metas_path.display());
    println!(" - {}", report.manifest_path.display());

    Ok(())
}

/// Options for a query run, mirroring the `query` subcommand flags
#[derive(Debug, Clone)]
pub struct QueryOptions<'a> {
    pub index_dir: &'a Path,
    pub query: &'a str,
    pub top_k: usize,
    pub filters: QueryFilters,
    pub show_steps: bool,
    pub recipes_jsonl: &'a Path,
}

/// Query the index and print ranked recipes
pub fn query(settings: &Settings, options: QueryOptions<'_>) -> Result<()> {
    let artifacts = ArtifactSet::load(options.index_dir)?;
    let embedder = embedder_from_config(&settings.embedding)?;

    let retrieval = retrieve(
        options.query,
        options.top_k,
        options.filters,
        &artifacts,
        embedder.as_ref(),
    )?;
    info!("Applied filters: {:?}", retrieval.filters);

    let mut results = retrieval.results;
    if options.show_steps && !results.is_empty() {
        StepStore::load(options.recipes_jsonl).enrich(&mut results);
    }

    print_results(options.query, &results, options.show_steps);
    Ok(())
}

fn print_results(query: &str, results: &[RecipeResult], show_steps: bool) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    println!("Top {} recipes for: \"{}\"\n", results.len(), query);
    for (i, result) in results.iter().enumerate() {
        let meta = &result.meta;
        let minutes = meta
            .minutes
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "None".to_string());
        let line = [
            format!("Title: {}", meta.recipe_title),
            format!("Minutes: {minutes}"),
            format!("Diets: {}", meta.diets.join(", ")),
            format!("Allergens: {}", meta.allergens.join(", ")),
            format!("Cuisine: {}", meta.cuisine.as_deref().unwrap_or("")),
            format!("Score: {:.3}", result.score),
        ];
        println!("{:>2}. {}", i + 1, line.join(" | "));
        println!("    {}...\n", snippet(&result.text, SNIPPET_CHARS));

        if show_steps {
            match &result.steps {
                Some(steps) => {
                    println!("    Steps:");
                    for (si, step) in steps.iter().enumerate() {
                        println!("      {}. {}", si + 1, step);
                    }
                }
                None => println!("    (No structured steps found for this recipe)"),
            }
            println!();
        }
    }
}
