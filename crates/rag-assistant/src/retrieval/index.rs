//! HNSW index over chunk embeddings, cosine distance

use std::cmp::Ordering;
use std::fmt;

use hnsw_rs::prelude::{DistCosine, Hnsw, Neighbour};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Upper bound on graph layers, as recommended by hnsw_rs
const MAX_LAYERS: usize = 16;

/// One retrieved chunk
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// `1 - cosine distance`, so 1.0 is an exact direction match
    pub similarity: f32,
}

/// Graph parameters, persisted with the index so a reload builds the same graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    /// Max neighbours per node
    pub m: usize,
    pub ef_construction: usize,
    /// Candidate list size at query time; raised to `k` when smaller
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
        }
    }
}

/// Chunks plus an HNSW graph over their embeddings.
///
/// Graph ids are positions in `chunks`. The raw embeddings are kept for
/// persistence.
pub struct VectorIndex {
    embedding_model: String,
    dimensions: usize,
    params: HnswParams,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    graph: Hnsw<'static, f32, DistCosine>,
}

impl fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorIndex")
            .field("embedding_model", &self.embedding_model)
            .field("dimensions", &self.dimensions)
            .field("params", &self.params)
            .field("len", &self.chunks.len())
            .finish()
    }
}

impl VectorIndex {
    /// Build an index with default graph parameters
    pub fn build(
        embedding_model: impl Into<String>,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        Self::build_with(HnswParams::default(), embedding_model, chunks, embeddings)
    }

    /// Build an index from chunks and their embeddings
    pub fn build_with(
        params: HnswParams,
        embedding_model: impl Into<String>,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::index_store(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if params.m == 0 || params.ef_construction == 0 {
            return Err(Error::index_store("HNSW m and ef_construction must be > 0"));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().position(|v| v.len() != dimensions) {
            return Err(Error::index_store(format!(
                "embedding {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimensions
            )));
        }

        let graph: Hnsw<'static, f32, DistCosine> = Hnsw::new(
            params.m,
            embeddings.len().max(1),
            MAX_LAYERS,
            params.ef_construction,
            DistCosine {},
        );
        for (id, vector) in embeddings.iter().enumerate() {
            graph.insert((vector.as_slice(), id));
        }

        Ok(Self {
            embedding_model: embedding_model.into(),
            dimensions,
            params,
            chunks,
            vectors: embeddings,
            graph,
        })
    }

    /// Return up to `k` chunks closest to `query`, best first.
    ///
    /// Equal scores are ordered by position in the index.
    pub fn query(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if self.chunks.is_empty() || query.is_empty() || k == 0 {
            return Vec::new();
        }

        if query.len() != self.dimensions {
            tracing::warn!(
                "Query has {} dimensions but index has {}",
                query.len(),
                self.dimensions
            );
            return Vec::new();
        }

        let ef = self.params.ef_search.max(k);
        let mut neighbours: Vec<Neighbour> = self.graph.search(query, k, ef);
        neighbours.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.d_id.cmp(&b.d_id))
        });

        neighbours
            .into_iter()
            .filter_map(|n| {
                self.chunks.get(n.d_id).map(|chunk| SearchHit {
                    chunk: chunk.clone(),
                    similarity: 1.0 - n.distance,
                })
            })
            .take(k)
            .collect()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn params(&self) -> HnswParams {
        self.params
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
