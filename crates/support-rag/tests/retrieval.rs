use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use support_rag::config::RetrievalConfig;
use support_rag::error::{Error, Result};
use support_rag::providers::{Embedder, VectorIndex};
use support_rag::retrieval::Retriever;
use support_rag::storage::SqliteVectorIndex;
use support_rag::types::{Chunk, DocumentMetadata, IndexedRecord};

/// Embedder with a fixed vector per question
struct TableEmbedder(HashMap<&'static str, Vec<f32>>);

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.0
            .get(text)
            .cloned()
            .ok_or_else(|| Error::embedding(format!("no vector for {:?}", text)))
    }

    fn name(&self) -> &str {
        "table"
    }
}

fn record(source: &str, text: &str, embedding: Vec<f32>) -> IndexedRecord {
    let metadata = DocumentMetadata {
        source: source.to_string(),
        path: format!("/docs/{}", source),
        page: None,
    };
    IndexedRecord::from_chunk(Chunk::new(text, metadata), embedding)
}

fn retriever(index: &SqliteVectorIndex) -> Retriever {
    let table = HashMap::from([
        ("east", vec![1.0, 0.0, 0.0]),
        ("west", vec![-1.0, 0.0, 0.0]),
        ("flat", vec![1.0, 0.0]),
    ]);
    Retriever::new(
        Arc::new(TableEmbedder(table)),
        Arc::new(index.clone()),
        RetrievalConfig::default(),
    )
}

async fn compass_index() -> SqliteVectorIndex {
    let index = SqliteVectorIndex::open_in_memory().unwrap();
    index
        .replace_all(vec![
            record("a.txt", "exactly east", vec![1.0, 0.0, 0.0]),
            record("b.txt", "mostly east", vec![0.9, 0.435_89, 0.0]),
            record("c.txt", "north", vec![0.0, 1.0, 0.0]),
            record("d.txt", "up", vec![0.0, 0.0, 1.0]),
        ])
        .await
        .unwrap();
    index
}

fn sources(chunks: &[Chunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.metadata.source.as_str()).collect()
}

#[tokio::test]
async fn test_keeps_only_candidates_within_threshold() {
    let index = compass_index().await;
    let chunks = retriever(&index).retrieve("east").await.unwrap();

    assert_eq!(sources(&chunks), vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_scored_candidates_are_ascending() {
    let index = compass_index().await;
    let scored = retriever(&index).retrieve_scored("east").await.unwrap();

    assert_eq!(scored.len(), 4);
    assert!(scored[0].distance.abs() < 1e-5);
    assert!((scored[1].distance - 0.2).abs() < 1e-3);
    assert!(scored.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_falls_back_to_nearest_two_when_nothing_is_close() {
    let index = compass_index().await;
    let chunks = retriever(&index).retrieve("west").await.unwrap();

    // c and d are equidistant; insertion order breaks the tie
    assert_eq!(sources(&chunks), vec!["c.txt", "d.txt"]);
}

#[tokio::test]
async fn test_candidates_capped_at_top_k() {
    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let records = (0..10)
        .map(|i| record(&format!("{:02}.txt", i), "east again", vec![1.0, 0.0, 0.0]))
        .collect();
    index.replace_all(records).await.unwrap();

    let chunks = retriever(&index).retrieve("east").await.unwrap();

    assert_eq!(
        sources(&chunks),
        vec!["00.txt", "01.txt", "02.txt", "03.txt", "04.txt", "05.txt"]
    );
}

#[tokio::test]
async fn test_empty_index_is_reported() {
    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let err = retriever(&index).retrieve("east").await.unwrap_err();

    assert!(matches!(err, Error::EmptyIndex));
}

#[tokio::test]
async fn test_dimension_mismatch_is_an_index_error() {
    let index = compass_index().await;
    let err = retriever(&index).retrieve("flat").await.unwrap_err();

    assert!(matches!(err, Error::VectorIndex(_)));
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vectordb").join("index.sqlite3");
    {
        let index = SqliteVectorIndex::open(&path).unwrap();
        index
            .replace_all(vec![record("a.txt", "exactly east", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();
    }

    let reopened = SqliteVectorIndex::open(&path).unwrap();
    assert_eq!(reopened.count().await.unwrap(), 1);
    let chunks = retriever(&reopened).retrieve("east").await.unwrap();
    assert_eq!(chunks[0].text, "exactly east");
    assert_eq!(chunks[0].metadata.path, "/docs/a.txt");
}
