// Command-line interface for the three pipeline phases

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recipe-rag")]
#[command(about = "Recipe retrieval pipeline - normalize, index and query recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a recipes CSV into recipes.jsonl and chunks.jsonl
    Normalize {
        /// Path to the recipes CSV
        #[arg(long)]
        csv: PathBuf,

        /// Output directory
        #[arg(long, default_value = "rag_jsonl")]
        out: PathBuf,

        /// Words per chunk
        #[arg(long, default_value_t = 400)]
        chunk_tokens: usize,

        /// Words shared by consecutive chunks
        #[arg(long, default_value_t = 80)]
        overlap: usize,

        /// Optional row limit for quick tests (0 = all rows)
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// Embed chunks and build the vector index with its sidecars
    Build {
        /// Path to chunks.jsonl
        #[arg(long)]
        chunks: PathBuf,

        /// Output directory
        #[arg(long, default_value = "index_artifacts")]
        out: PathBuf,
    },

    /// Query a built index
    Query {
        /// Directory with the index, sidecars and manifest
        #[arg(long, default_value = "index_artifacts")]
        index_dir: PathBuf,

        /// Search query
        #[arg(long)]
        query: String,

        /// Number of recipes to return after deduplication
        #[arg(long, default_value_t = 10)]
        top_k: usize,

        /// Maximum total minutes
        #[arg(long)]
        filter_max_minutes: Option<i64>,

        /// Diet substring, e.g. vegan
        #[arg(long)]
        filter_diet: Option<String>,

        /// Meal substring, e.g. dinner / lunch / breakfast
        #[arg(long)]
        filter_meal: Option<String>,

        /// Drop recipes whose allergens mention this, e.g. nuts
        #[arg(long)]
        exclude_allergen: Option<String>,

        /// Comma-separated ingredients to avoid, e.g. 'chicken, beef'
        #[arg(long)]
        exclude_ingredients: Option<String>,

        /// Print full step-by-step instructions from recipes.jsonl
        #[arg(long)]
        show_steps: bool,

        /// Path to recipes.jsonl (used with --show-steps)
        #[arg(long, default_value = "rag_jsonl/recipes.jsonl")]
        recipes_jsonl: PathBuf,
    },
}
