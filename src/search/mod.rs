// Query-time filtering, deduplication and ranking over a built index

pub mod engine;
pub mod filters;
pub mod steps;

// Re-exports
pub use engine::{dedupe_by_doc, rank, retrieve, RecipeResult, Retrieval, OVERSAMPLE_FACTOR};
pub use filters::{ActiveFilters, AutoFilters, QueryFilters};
pub use steps::StepStore;
