//! Error types for the `ragchat-rag` crate.

use thiserror::Error;

/// Errors that can occur in chunking, indexing and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding does not have the dimensionality the index was configured with.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The configured dimensionality.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// An embedding holds a NaN or infinite component.
    #[error("Invalid embedding: component {index} is {value}")]
    InvalidEmbedding {
        /// Position of the first non-finite component.
        index: usize,
        /// The offending value.
        value: f32,
    },

    /// Parallel input sequences have different lengths.
    #[error("Length mismatch: {chunks} chunks but {embeddings} embeddings")]
    LengthMismatch {
        /// Number of chunks supplied.
        chunks: usize,
        /// Number of embeddings supplied.
        embeddings: usize,
    },

    /// An operation received no input to work on.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A query was issued against an index with no stored vectors.
    #[error("Index '{0}' is empty")]
    EmptyIndex(String),

    /// The requested identifier is not stored in the index.
    #[error("Not found: '{0}'")]
    NotFound(String),

    /// The supplied identifier is already stored in the index.
    #[error("Duplicate id: '{0}'")]
    DuplicateId(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single document could not be ingested.
    #[error("Ingestion of document '{document_id}' failed: {message}")]
    IngestionError {
        /// The document that failed.
        document_id: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// Shorthand for building a [`RagError::VectorStoreError`].
    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        RagError::VectorStoreError { backend: backend.to_string(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
