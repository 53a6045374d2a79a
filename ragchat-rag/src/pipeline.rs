//! Ingestion pipeline.
//!
//! The [`RagPipeline`] coordinates document ingestion by composing a
//! [`Chunker`], an [`EmbeddingProvider`] and a [`VectorIndex`], and hands out
//! a [`Retriever`] over the same index for queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_rag::{RagPipeline, RagConfig, InMemoryVectorIndex, SentenceChunker};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new("docs", 384)))
//!     .build()?;
//!
//! let report = pipeline.ingest_batch(documents).await;
//! let results = pipeline.search("search query").await?;
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::chunking::{Chunker, SentenceChunker};
use crate::config::RagConfig;
use crate::document::{Document, Metadata, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retriever::Retriever;
use crate::vectorstore::VectorIndex;

/// A document that could not be ingested.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngestionFailure {
    /// The failed document.
    pub document_id: String,
    /// Why it failed.
    pub reason: String,
}

/// Summary of a batch ingestion.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IngestionReport {
    /// Number of documents whose chunks were stored.
    pub documents_ingested: usize,
    /// Number of documents that produced no chunks.
    pub documents_empty: usize,
    /// Total number of chunks stored.
    pub chunks_added: usize,
    /// Documents that failed, in completion order.
    pub failures: Vec<IngestionFailure>,
}

impl IngestionReport {
    /// Whether every document was processed without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record a failure that happened before the pipeline saw the document.
    pub fn record_failure(&mut self, document_id: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(IngestionFailure {
            document_id: document_id.into(),
            reason: reason.into(),
        });
    }
}

/// The ingestion pipeline.
///
/// Ingestion runs chunk → embed → add per document. Documents are processed
/// concurrently; the index serializes the writes. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    retriever: Retriever,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return the retriever over this pipeline's index.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        self.retriever.embedder()
    }

    /// Return a reference to the vector index.
    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        self.retriever.index()
    }

    /// Ingest a single document: chunk → embed → add.
    ///
    /// Returns the ids of the stored chunks; a document without text stores nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] carrying the document id if
    /// embedding or storage fails.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<String>> {
        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider().embed_batch(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            ingestion_error(document, format!("embedding failed: {e}"))
        })?;
        if embeddings.len() != chunks.len() {
            return Err(ingestion_error(
                document,
                format!(
                    "embedding provider returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            ));
        }

        let ids = self.vector_index().add(chunks, embeddings).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "add failed during ingestion");
            ingestion_error(document, format!("add failed: {e}"))
        })?;

        info!(document.id = %document.id, chunk_count = ids.len(), "ingested document");
        Ok(ids)
    }

    /// Ingest many documents, continuing past individual failures.
    ///
    /// Up to `ingest_concurrency` documents are chunked and embedded at once.
    pub async fn ingest_batch(&self, documents: Vec<Document>) -> IngestionReport {
        let total = documents.len();
        let outcomes: Vec<(String, Result<Vec<String>>)> = stream::iter(documents)
            .map(|document| async move {
                let outcome = self.ingest(&document).await;
                (document.id, outcome)
            })
            .buffer_unordered(self.config.ingest_concurrency)
            .collect()
            .await;

        let mut report = IngestionReport::default();
        for (document_id, outcome) in outcomes {
            match outcome {
                Ok(ids) if ids.is_empty() => report.documents_empty += 1,
                Ok(ids) => {
                    report.documents_ingested += 1;
                    report.chunks_added += ids.len();
                }
                Err(e) => {
                    warn!(document.id = %document_id, error = %e, "skipping document");
                    report.record_failure(document_id, e.to_string());
                }
            }
        }

        info!(
            document_count = total,
            chunks_added = report.chunks_added,
            failure_count = report.failures.len(),
            "batch ingestion completed"
        );
        report
    }

    /// Search with the configured `top_k` and `similarity_threshold`.
    ///
    /// # Errors
    ///
    /// See [`Retriever::search`].
    pub async fn search(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        self.retriever.search(query, self.config.top_k, self.config.similarity_threshold).await
    }

    /// Re-embed `text` and store it under an existing chunk id.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if the id is unknown, or the embedding error.
    pub async fn update_chunk(&self, id: &str, text: &str, metadata: Option<Metadata>) -> Result<()> {
        let embedding = self.embedding_provider().embed(text).await?;
        self.vector_index().update(id, text, embedding, metadata).await?;
        info!(chunk.id = id, "updated chunk");
        Ok(())
    }
}

fn ingestion_error(document: &Document, message: String) -> RagError {
    RagError::IngestionError { document_id: document.id.clone(), message }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The embedding provider and vector index are required. Without an explicit
/// chunker a [`SentenceChunker`] is built from the config's chunk settings.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Set a custom document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing, the
    /// config is invalid, or the provider and index disagree on dimensionality.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_index = self
            .vector_index
            .ok_or_else(|| RagError::ConfigError("vector_index is required".to_string()))?;

        if embedding_provider.dimensions() != vector_index.dimensions() {
            return Err(RagError::ConfigError(format!(
                "embedding provider produces {} dimensions but index '{}' expects {}",
                embedding_provider.dimensions(),
                vector_index.collection(),
                vector_index.dimensions()
            )));
        }

        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline {
            config,
            chunker,
            retriever: Retriever::new(embedding_provider, vector_index),
        })
    }
}
