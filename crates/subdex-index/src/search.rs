//! Query engine over a loaded artifact.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;

use subdex_core::traits::Embedder;
use subdex_core::types::SearchResult;
use subdex_core::{Error, Result};

use crate::artifact::Artifact;
use crate::flat::l2_normalize;

/// Read-only search engine: one artifact, one embedder, no state across
/// queries. The embedder must be the same configuration the artifact was
/// built with; a dimension mismatch is refused at construction.
pub struct SearchEngine {
    artifact: Artifact,
    embedder: Box<dyn Embedder>,
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("artifact", &self.artifact)
            .field("embedder_dim", &self.embedder.dim())
            .finish()
    }
}

/// Ranked results plus the wall-clock cost of embed + search, reported as
/// an observability signal only.
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub elapsed: Duration,
}

impl SearchEngine {
    pub fn new(artifact: Artifact, embedder: Box<dyn Embedder>) -> Result<Self> {
        if embedder.dim() != artifact.index.dim() {
            return Err(Error::Index(format!(
                "embedder dimension {} does not match artifact dimension {}",
                embedder.dim(),
                artifact.index.dim()
            )));
        }
        Ok(Self { artifact, embedder })
    }

    /// Load the persisted artifact pair and wrap it with the embedder.
    pub fn load(prefix: &Path, embedder: Box<dyn Embedder>) -> Result<Self> {
        Self::new(Artifact::load(prefix)?, embedder)
    }

    /// Number of indexed subjects.
    pub fn len(&self) -> usize {
        self.artifact.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.index.is_empty()
    }

    /// Top-k search. A blank query returns an empty outcome without
    /// touching the index. A hit whose position has no metadata entry is
    /// skipped silently; its rank number is not reused.
    pub fn search(&self, query: &str, top_k: usize) -> Result<SearchOutcome> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(SearchOutcome { results: Vec::new(), elapsed: Duration::ZERO });
        }

        let start = Instant::now();
        let mut vectors = self
            .embedder
            .embed_batch(&[query.to_string()])
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let mut query_vector = vectors
            .pop()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".to_string()))?;
        l2_normalize(&mut query_vector);

        let hits = self.artifact.index.search(&query_vector, top_k)?;
        let mut results = Vec::with_capacity(hits.len());
        for (hit_number, (position, score)) in hits.into_iter().enumerate() {
            match self.artifact.metadata.get(position) {
                Some((subject, links)) => results.push(SearchResult {
                    rank: hit_number + 1,
                    score,
                    subject: subject.clone(),
                    links: links.clone(),
                }),
                None => {
                    debug!(position, "hit without metadata entry, skipping");
                }
            }
        }
        let elapsed = start.elapsed();
        Ok(SearchOutcome { results, elapsed })
    }
}
