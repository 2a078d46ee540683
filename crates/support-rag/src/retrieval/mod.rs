//! Retrieval of grounding chunks from the vector index

mod retriever;

pub use retriever::{filter_by_distance, Retriever};
