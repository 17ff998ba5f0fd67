use clap::Parser;
use recipe_rag::{
    cli::{
        commands::{self, QueryOptions},
        Cli, Commands,
    },
    config::Settings,
    search::QueryFilters,
    Result,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout only carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_rag=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.log_safe());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Normalize {
            csv,
            out,
            chunk_tokens,
            overlap,
            limit,
        } => commands::normalize(&csv, &out, chunk_tokens, overlap, limit),
        Commands::Build { chunks, out } => commands::build(&load_settings()?, &chunks, &out),
        Commands::Query {
            index_dir,
            query,
            top_k,
            filter_max_minutes,
            filter_diet,
            filter_meal,
            exclude_allergen,
            exclude_ingredients,
            show_steps,
            recipes_jsonl,
        } => commands::query(
            &load_settings()?,
            QueryOptions {
                index_dir: &index_dir,
                query: &query,
                top_k,
                filters: QueryFilters {
                    max_minutes: filter_max_minutes,
                    diet: filter_diet,
                    meal: filter_meal,
                    exclude_allergen,
                    exclude_ingredients,
                },
                show_steps,
                recipes_jsonl: &recipes_jsonl,
            },
        ),
    }
}

// Only the embedding phases read the environment.
fn load_settings() -> Result<Settings> {
    let settings = Settings::from_env()?;
    settings.validate()?;
    Ok(settings)
}
