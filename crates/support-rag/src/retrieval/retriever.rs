//! Distance-filtered retrieval with a small unfiltered fallback

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::{Embedder, VectorIndex};
use crate::types::{Chunk, QueryResult};

/// Keep candidates within `threshold`; if none qualify, keep the first
/// `fallback` candidates as ranked. Order is preserved either way.
pub fn filter_by_distance(
    candidates: Vec<QueryResult>,
    threshold: f32,
    fallback: usize,
) -> Vec<QueryResult> {
    if candidates.iter().any(|c| c.distance <= threshold) {
        candidates
            .into_iter()
            .filter(|c| c.distance <= threshold)
            .collect()
    } else {
        candidates.into_iter().take(fallback).collect()
    }
}

/// Retrieves the chunks used to ground an answer
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Ranked candidates with their distances
    pub async fn retrieve_scored(&self, question: &str) -> Result<Vec<QueryResult>> {
        if self.index.count().await? == 0 {
            return Err(Error::EmptyIndex);
        }

        let vector = self.embedder.embed(question).await?;
        let candidates = self.index.query(&vector, self.config.top_k).await?;
        let fetched = candidates.len();

        let kept = filter_by_distance(
            candidates,
            self.config.distance_threshold,
            self.config.fallback_count,
        );

        tracing::debug!(
            fetched,
            kept = kept.len(),
            threshold = self.config.distance_threshold,
            "Retrieved candidates"
        );
        Ok(kept)
    }

    /// Ranked chunks for grounding, best first
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Chunk>> {
        Ok(self
            .retrieve_scored(question)
            .await?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn candidate(text: &str, distance: f32) -> QueryResult {
        QueryResult::new(
            Chunk::new(
                text,
                DocumentMetadata {
                    source: "faq.txt".into(),
                    path: "data/faq.txt".into(),
                    page: None,
                },
            ),
            distance,
        )
    }

    fn texts(results: &[QueryResult]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.text.as_str()).collect()
    }

    #[test]
    fn test_keeps_only_close_candidates() {
        let kept = filter_by_distance(
            vec![
                candidate("a", 0.2),
                candidate("b", 0.8),
                candidate("c", 0.81),
                candidate("d", 1.4),
            ],
            0.8,
            2,
        );
        assert_eq!(texts(&kept), vec!["a", "b"]);
    }

    #[test]
    fn test_falls_back_to_top_two() {
        let kept = filter_by_distance(
            vec![
                candidate("a", 0.9),
                candidate("b", 1.1),
                candidate("c", 1.2),
                candidate("d", 1.5),
                candidate("e", 1.7),
                candidate("f", 1.9),
            ],
            0.8,
            2,
        );
        assert_eq!(texts(&kept), vec!["a", "b"]);
    }

    #[test]
    fn test_single_candidate_fallback() {
        let kept = filter_by_distance(vec![candidate("only", 1.3)], 0.8, 2);
        assert_eq!(texts(&kept), vec!["only"]);
        assert!(filter_by_distance(Vec::new(), 0.8, 2).is_empty());
    }
}
