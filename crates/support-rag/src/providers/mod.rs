//! Provider abstractions for embeddings, generation and vector storage
//!
//! Trait-based seams let the pipeline run against Ollama or Groq in
//! production and against deterministic fakes in tests.

pub mod embedding;
pub mod groq;
pub mod http;
pub mod llm;
pub mod ollama;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{LlmProvider, RagConfig};
use crate::error::Result;

pub use embedding::Embedder;
pub use groq::GroqGenerator;
pub use llm::Generator;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
pub use vector_store::VectorIndex;

/// Build the embedder selected by configuration
pub fn embedder_from_config(config: &RagConfig) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(OllamaEmbedder::new(&config.llm, &config.embeddings)?))
}

/// Build the generator selected by `llm.provider`
pub fn generator_from_config(config: &RagConfig) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match config.llm.provider {
        LlmProvider::Ollama => Arc::new(OllamaGenerator::new(&config.llm)?),
        LlmProvider::Groq => Arc::new(GroqGenerator::new(&config.llm)?),
    };
    Ok(generator)
}
