pub mod config;
pub mod error;
pub mod models;

// Pipeline phases
pub mod ingest;
pub mod indexer;
pub mod search;

// External collaborators
pub mod embedding;

pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
