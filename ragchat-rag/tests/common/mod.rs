//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ragchat_rag::{EmbeddingProvider, RagError, Result};

/// Policy corpus used across the retrieval tests.
pub const POLICY_TEXT: &str = "Policy A increases housing supply. Policy B lowers rates.";

const FEATURES: [&str; 7] =
    ["policy a", "policy b", "housing", "supply", "rates", "lowers", "increases"];

/// Embeds text as keyword presence over a fixed vocabulary plus a small bias,
/// so similarity follows shared keywords and no vector is zero.
pub struct KeywordEmbedder {
    /// Texts containing this marker fail to embed.
    pub fail_on: Option<&'static str>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self { fail_on: None }
    }

    pub fn failing_on(marker: &'static str) -> Self {
        Self { fail_on: Some(marker) }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(marker) = self.fail_on {
            if text.contains(marker) {
                return Err(RagError::EmbeddingError {
                    provider: "keyword".to_string(),
                    message: format!("refusing to embed '{marker}'"),
                });
            }
        }
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> =
            FEATURES.iter().map(|f| if lower.contains(f) { 1.0 } else { 0.0 }).collect();
        vector.push(0.1);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        FEATURES.len() + 1
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}
