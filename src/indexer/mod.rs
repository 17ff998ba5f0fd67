// Vector index construction, persistence and loading

pub mod artifacts;
pub mod builder;
pub mod flat;

// Re-exports
pub use artifacts::{ArtifactSet, Manifest};
pub use builder::{build_from_chunks, build_index, BuildReport};
pub use flat::{FlatIpIndex, Neighbor, VectorIndex};
