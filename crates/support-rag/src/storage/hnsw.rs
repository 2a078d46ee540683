//! HNSW graph over unit-normalized embeddings
//!
//! Points are keyed by their row position in the record table. The graph uses
//! Euclidean distance; results are reported as squared distance, which for
//! unit vectors equals `2 - 2·cos`.

use hnsw_rs::prelude::*;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};

/// Layer cap imposed by hnsw_rs
const MAX_LAYERS: usize = 16;

/// Candidates pulled from the graph per query before ranking
const MIN_CANDIDATES: usize = 64;

/// Immutable search graph, rebuilt whenever the record table changes
pub struct HnswGraph {
    hnsw: Hnsw<'static, f32, DistL2>,
    dimensions: usize,
    ef_search: usize,
    len: usize,
}

impl HnswGraph {
    /// Build a graph from `(position, vector)` pairs sharing one dimension
    pub fn build(points: &[(usize, Vec<f32>)], params: &VectorDbConfig) -> Result<Self> {
        let dimensions = points.first().map(|(_, v)| v.len()).unwrap_or(0);
        if let Some((position, vector)) = points.iter().find(|(_, v)| v.len() != dimensions) {
            return Err(Error::vector_index(format!(
                "Record at position {} has {} dimensions, expected {}",
                position,
                vector.len(),
                dimensions
            )));
        }

        let mut hnsw = Hnsw::<f32, DistL2>::new(
            params.hnsw_m,
            points.len().max(1),
            MAX_LAYERS,
            params.hnsw_ef_construction,
            DistL2 {},
        );
        for (position, vector) in points {
            hnsw.insert((vector, *position));
        }
        hnsw.set_searching_mode(true);

        Ok(Self {
            hnsw,
            dimensions,
            ef_search: params.hnsw_ef_search,
            len: points.len(),
        })
    }

    /// Graph with no points
    pub fn empty(params: &VectorDbConfig) -> Self {
        Self {
            hnsw: Hnsw::<f32, DistL2>::new(
                params.hnsw_m,
                1,
                MAX_LAYERS,
                params.hnsw_ef_construction,
                DistL2 {},
            ),
            dimensions: 0,
            ef_search: params.hnsw_ef_search,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Up to `k` `(position, squared distance)` pairs, ascending, ties by position
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(Error::vector_index(format!(
                "Query has {} dimensions but the index stores {}",
                query.len(),
                self.dimensions
            )));
        }

        let wanted = k.max(MIN_CANDIDATES).min(self.len);
        let ef = self.ef_search.max(wanted);
        let mut hits: Vec<(usize, f32)> = self
            .hnsw
            .search(query, wanted, ef)
            .into_iter()
            .map(|n| (n.d_id, n.distance * n.distance))
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }
}
