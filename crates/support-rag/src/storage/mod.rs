//! Storage module for persistent data
//!
//! Provides the vector index: SQLite records searched through an HNSW graph.

mod hnsw;
mod vector_index;

pub use hnsw::HnswGraph;
pub use vector_index::SqliteVectorIndex;
