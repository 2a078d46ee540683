//! Vector index trait for storing and searching embedded chunks

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{IndexedRecord, QueryResult};

/// Persistent nearest-neighbour index over [`IndexedRecord`]s
///
/// Implementations:
/// - `SqliteVectorIndex`: single-table SQLite store with brute-force search
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records, replacing any with the same id
    async fn upsert(&self, records: Vec<IndexedRecord>) -> Result<()>;

    /// Atomically replace the whole contents with `records`
    async fn replace_all(&self, records: Vec<IndexedRecord>) -> Result<()>;

    /// Up to `k` nearest records, ascending by distance
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>>;

    /// Number of stored records
    async fn count(&self) -> Result<usize>;

    /// Check if the index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
