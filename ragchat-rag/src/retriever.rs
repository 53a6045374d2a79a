//! Similarity search with threshold filtering and context formatting.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::document::{IndexHit, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// Context returned by [`Retriever::build_context`] when there is nothing to show.
pub const NO_RELEVANT_DOCUMENTS: &str = "No relevant documents were found.";

/// Tolerance for floating point noise around the valid similarity range.
const SIMILARITY_EPSILON: f32 = 1e-4;

/// Convert a cosine distance into a similarity in `[0, 1]`.
///
/// Cosine distances live in `[0, 2]`, so `1 - distance` lies in `[-1, 1]`.
/// Anything outside that range means the index uses another metric; it is
/// logged and clamped rather than propagated.
pub fn distance_to_similarity(distance: f32) -> f32 {
    let raw = 1.0 - distance;
    if raw.is_nan() || !(-1.0 - SIMILARITY_EPSILON..=1.0 + SIMILARITY_EPSILON).contains(&raw) {
        warn!(distance, similarity = raw, "distance outside cosine range, check the index metric");
    }
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

/// Turns a question into ranked, threshold-filtered results from a [`VectorIndex`].
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::Retriever;
///
/// let retriever = Retriever::new(embedder, index);
/// let results = retriever.search("What does Policy A do?", 3, 0.5).await?;
/// let context = Retriever::build_context(&results);
/// ```
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a retriever over `index` that embeds queries with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Return a reference to the embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Search for the `top_k` chunks most similar to `query`.
    ///
    /// Candidates with similarity below `threshold` are dropped; the rest are
    /// ranked from 1 in descending similarity, ties keeping index order. An
    /// empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `threshold` is outside `[0, 1]`,
    /// and propagates embedding and index failures.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievalResult>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RagError::ConfigError(format!(
                "similarity threshold ({threshold}) must be within [0, 1]"
            )));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during search");
            e
        })?;

        let hits = match self.index.query(&embedding, top_k).await {
            Ok(hits) => hits,
            Err(RagError::EmptyIndex(collection)) => {
                debug!(%collection, "search against empty index");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(collection = self.index.collection(), error = %e, "index query failed");
                return Err(e);
            }
        };

        let candidate_count = hits.len();
        let results = rank(hits, threshold);
        info!(candidate_count, result_count = results.len(), threshold, "search completed");
        Ok(results)
    }

    /// Format ranked results as a context block for the prompt.
    ///
    /// Each result becomes `[similarity: 0.87] text`; blocks are separated by
    /// a blank line. Returns [`NO_RELEVANT_DOCUMENTS`] for an empty slice.
    pub fn build_context(results: &[RetrievalResult]) -> String {
        if results.is_empty() {
            return NO_RELEVANT_DOCUMENTS.to_string();
        }
        results
            .iter()
            .map(|r| format!("[similarity: {:.2}] {}", r.similarity, r.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Convert hits to similarities, filter by `threshold` and assign ranks.
fn rank(hits: Vec<IndexHit>, threshold: f32) -> Vec<RetrievalResult> {
    let mut results: Vec<RetrievalResult> = hits
        .into_iter()
        .map(|hit| RetrievalResult {
            similarity: distance_to_similarity(hit.distance),
            id: hit.id,
            text: hit.text,
            metadata: hit.metadata,
            rank: 0,
        })
        .filter(|r| r.similarity >= threshold)
        .collect();

    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;

    fn hit(id: &str, distance: f32) -> IndexHit {
        IndexHit {
            id: id.to_string(),
            text: format!("text of {id}"),
            metadata: Metadata::default(),
            distance,
        }
    }

    #[test]
    fn similarity_is_clamped() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
        assert_eq!(distance_to_similarity(1.5), 0.0);
        assert_eq!(distance_to_similarity(-0.5), 1.0);
        assert_eq!(distance_to_similarity(f32::NAN), 0.0);
        assert!((distance_to_similarity(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn rank_filters_and_orders() {
        let results = rank(vec![hit("a", 0.4), hit("b", 0.1), hit("c", 0.9), hit("d", 0.1)], 0.5);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a"]);
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn build_context_formats_results() {
        let results = rank(vec![hit("a", 0.13), hit("b", 0.3)], 0.0);
        let context = Retriever::build_context(&results);
        assert_eq!(context, "[similarity: 0.87] text of a\n\n[similarity: 0.70] text of b");
    }

    #[test]
    fn build_context_on_empty_results_returns_sentinel() {
        assert_eq!(Retriever::build_context(&[]), NO_RELEVANT_DOCUMENTS);
    }
}
