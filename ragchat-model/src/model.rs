use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerationConfig, Message};

/// A chat completion backend.
///
/// `generate` sends the full message list and waits for one complete reply.
/// Implementations classify failures so callers can retry
/// [`ModelError::Transient`](crate::ModelError::Transient) errors only.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model.
    fn name(&self) -> &str;

    /// Generate a reply to `messages`.
    async fn generate(&self, messages: &[Message], config: &GenerationConfig) -> Result<String>;
}
