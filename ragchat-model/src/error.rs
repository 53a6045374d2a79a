//! Error types for the `ragchat-model` crate.

use thiserror::Error;

/// Errors returned by a [`ChatModel`](crate::ChatModel).
///
/// The split lets callers decide whether a retry can help.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Timeouts, rate limits, server errors and dropped connections.
    #[error("transient model error: {0}")]
    Transient(String),

    /// Rejected requests such as bad credentials or an unknown model.
    #[error("model error: {0}")]
    Permanent(String),

    /// The provider answered but the reply had no usable content.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The model could not be constructed.
    #[error("model configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
