//! # ragchat-rag
//!
//! Ingestion and retrieval for the ragchat conversation engine.
//!
//! ## Overview
//!
//! - [`SentenceChunker`] / [`split_text`] - overlapping, boundary-aligned chunks
//! - [`VectorIndex`] - the vector index contract (add, query, update, delete, count)
//! - [`InMemoryVectorIndex`] and [`FileVectorIndex`] - index adapters
//! - [`EmbeddingProvider`] - the embedding collaborator
//! - [`Retriever`] - threshold-filtered, ranked search and context formatting
//! - [`RagPipeline`] - concurrent, failure-tolerant ingestion
//!
//! ## Features
//!
//! - `openai` - [`openai::OpenAIEmbeddingProvider`]

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod file;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, SentenceChunker, TextSegment, split_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, Document, IndexHit, Metadata, MetadataValue, RetrievalResult, StoredVector,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use file::FileVectorIndex;
pub use inmemory::{InMemoryVectorIndex, generate_id};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{IngestionFailure, IngestionReport, RagPipeline, RagPipelineBuilder};
pub use retriever::{NO_RELEVANT_DOCUMENTS, Retriever, distance_to_similarity};
pub use vectorstore::VectorIndex;
