//! Vector index trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, IndexHit, Metadata};
use crate::error::Result;

/// A single collection of embeddings with similarity search.
///
/// Every instance owns exactly one collection with a fixed dimensionality.
/// Distances are cosine distances (`1 - cosine similarity`, in `[0, 2]`).
/// Mutations are serialized by the implementation; queries may run
/// concurrently with each other.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new("docs", 384);
/// index.add(chunks, embeddings).await?;
/// let hits = index.query(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Name of the collection backing this index.
    fn collection(&self) -> &str;

    /// Dimensionality every stored embedding must have.
    fn dimensions(&self) -> usize;

    /// Store chunks with their embeddings.
    ///
    /// Chunk metadata is stored alongside the vector. Chunks with an empty id
    /// are assigned a generated one. Returns the stored ids in input order.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`](crate::RagError::EmptyInput) if `chunks` is empty
    /// - [`RagError::LengthMismatch`](crate::RagError::LengthMismatch) if the two
    ///   sequences differ in length
    /// - [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch) if an
    ///   embedding has the wrong length
    /// - [`RagError::DuplicateId`](crate::RagError::DuplicateId) if an id is already stored
    async fn add(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Vec<String>>;

    /// Return at most `top_k` nearest neighbours ordered by ascending distance.
    ///
    /// Ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`](crate::RagError::EmptyIndex) if nothing is stored.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexHit>>;

    /// Replace the text and embedding stored under `id`.
    ///
    /// When `metadata` is `None` the stored metadata is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`](crate::RagError::NotFound) if `id` is not stored.
    async fn update(
        &self,
        id: &str,
        text: &str,
        embedding: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<()>;

    /// Delete vectors by id. Unknown ids are ignored. Returns how many were removed.
    async fn delete(&self, ids: &[&str]) -> Result<usize>;

    /// Remove every stored vector. Succeeds on an already empty collection.
    async fn delete_collection(&self) -> Result<()>;

    /// Number of stored vectors.
    async fn count(&self) -> Result<usize>;
}
