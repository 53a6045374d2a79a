use thiserror::Error;

/// Errors from conversation and prompt handling.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// A history cap below two cannot hold a question with its answer.
    #[error("max_turns must be at least 2, got {0}")]
    InvalidCapacity(usize),

    /// Only user and assistant turns are stored.
    #[error("conversation turns must be user or assistant, got {0}")]
    InvalidRole(ragchat_model::Role),

    /// A prompt template lacks a required placeholder.
    #[error("prompt template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
