//! Embedder trait for turning text into vectors

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// The same embedder must be used for ingestion and for queries; vectors from
/// different models are not comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
