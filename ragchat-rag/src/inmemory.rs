//! In-memory vector index using cosine distance.
//!
//! This module provides [`InMemoryVectorIndex`], a dependency-free index
//! backed by a `Vec` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and small-scale use cases. The record-level
//! logic lives in [`Collection`] so persistent adapters can reuse it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, IndexHit, Metadata, StoredVector};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an identifier of the form `seg_{timestamp}_{sequence}`.
///
/// The sequence is process-wide, so ids never collide within one run.
pub fn generate_id() -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
    format!("seg_{timestamp}_{seq}")
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// The records of one collection, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct Collection {
    #[serde(rename = "collection")]
    pub(crate) name: String,
    pub(crate) dimensions: usize,
    pub(crate) records: Vec<StoredVector>,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self { name: name.into(), dimensions, records: Vec::new() }
    }

    /// Length and finiteness checks shared by add, update and query.
    fn check_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        if let Some((index, &value)) = embedding.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(RagError::InvalidEmbedding { index, value });
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Validate the whole batch before storing anything, so a failed add
    /// leaves the collection untouched.
    pub(crate) fn add(
        &mut self,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<String>> {
        if chunks.is_empty() {
            return Err(RagError::EmptyInput("no chunks to add".to_string()));
        }
        if chunks.len() != embeddings.len() {
            return Err(RagError::LengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        for embedding in &embeddings {
            self.check_embedding(embedding)?;
        }

        let existing: HashSet<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        let mut ids = Vec::with_capacity(chunks.len());
        let mut batch: HashSet<String> = HashSet::with_capacity(chunks.len());
        for chunk in &chunks {
            let id = if chunk.id.is_empty() { generate_id() } else { chunk.id.clone() };
            if existing.contains(id.as_str()) || !batch.insert(id.clone()) {
                return Err(RagError::DuplicateId(id));
            }
            ids.push(id);
        }

        for ((chunk, embedding), id) in chunks.into_iter().zip(embeddings).zip(ids.iter()) {
            self.records.push(StoredVector {
                id: id.clone(),
                embedding,
                text: chunk.text,
                metadata: chunk.metadata,
            });
        }
        Ok(ids)
    }

    pub(crate) fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexHit>> {
        if self.records.is_empty() {
            return Err(RagError::EmptyIndex(self.name.clone()));
        }
        self.check_embedding(embedding)?;

        let mut hits: Vec<IndexHit> = self
            .records
            .iter()
            .map(|record| IndexHit {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: 1.0 - cosine_similarity(&record.embedding, embedding),
            })
            .collect();

        // `sort_by` is stable, so equal distances keep insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }

    pub(crate) fn update(
        &mut self,
        id: &str,
        text: &str,
        embedding: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        self.check_embedding(&embedding)?;
        let pos = self.position(id).ok_or_else(|| RagError::NotFound(id.to_string()))?;
        let record = &mut self.records[pos];
        record.text = text.to_string();
        record.embedding = embedding;
        if let Some(metadata) = metadata {
            record.metadata = metadata;
        }
        Ok(())
    }

    pub(crate) fn delete(&mut self, ids: &[&str]) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id.as_str()));
        before - self.records.len()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

/// An in-memory vector index using cosine distance.
///
/// All operations are async-safe via `tokio::sync::RwLock`: writers take the
/// lock exclusively, queries share it.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new("docs", 384);
/// assert_eq!(index.count().await?, 0);
/// ```
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    name: String,
    dimensions: usize,
    collection: RwLock<Collection>,
}

impl InMemoryVectorIndex {
    /// Create a new empty index for `collection` holding `dimensions`-long vectors.
    pub fn new(collection: impl Into<String>, dimensions: usize) -> Self {
        let name = collection.into();
        Self {
            collection: RwLock::new(Collection::new(name.clone(), dimensions)),
            name,
            dimensions,
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn collection(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn add(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Vec<String>> {
        let mut collection = self.collection.write().await;
        let ids = collection.add(chunks, embeddings)?;
        debug!(collection = %self.name, added = ids.len(), total = collection.len(), "added vectors");
        Ok(ids)
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexHit>> {
        self.collection.read().await.query(embedding, top_k)
    }

    async fn update(
        &self,
        id: &str,
        text: &str,
        embedding: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        self.collection.write().await.update(id, text, embedding, metadata)
    }

    async fn delete(&self, ids: &[&str]) -> Result<usize> {
        Ok(self.collection.write().await.delete(ids))
    }

    async fn delete_collection(&self) -> Result<()> {
        self.collection.write().await.clear();
        debug!(collection = %self.name, "deleted collection");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.collection.read().await.len())
    }
}
