//! Error types for the `ragchat-runner` crate.

use std::time::Duration;

use ragchat_model::ModelError;
use ragchat_rag::RagError;
use ragchat_session::SessionError;
use thiserror::Error;

/// Errors raised while configuring or running a conversation.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Invalid settings or a builder missing a component.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chunking, indexing or retrieval failed.
    #[error(transparent)]
    Rag(#[from] RagError),

    /// The conversation history rejected an operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The model failed after any retries.
    #[error("generation failed: {0}")]
    Generation(#[from] ModelError),

    /// The call ran past its deadline.
    #[error("no answer within {0:?}")]
    GenerationTimeout(Duration),

    /// The question was blank.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// A document source could not supply a document.
    #[error("failed to fetch document '{id}': {message}")]
    Source {
        /// The requested document id.
        id: String,
        /// A description of the failure.
        message: String,
    },
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
