//! Connection settings for the OpenAI adapter.

use crate::error::{ModelError, Result};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat model used when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for [`OpenAIChatModel`](super::OpenAIChatModel).
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// API root without a trailing slash.
    pub base_url: String,
    /// Optional `OpenAI-Organization` header value.
    pub organization_id: Option<String>,
}

impl OpenAIConfig {
    /// Settings for `model` on the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_BASE.to_string(),
            organization_id: None,
        }
    }

    /// Read the key from `OPENAI_API_KEY` and use [`DEFAULT_CHAT_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        Ok(Self::new(api_key, DEFAULT_CHAT_MODEL))
    }

    /// Use another model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at an OpenAI-compatible endpoint. A trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bill requests to an organization.
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = OpenAIConfig::new("key", DEFAULT_CHAT_MODEL)
            .with_model("gpt-4o")
            .with_base_url("http://localhost:8080/v1/")
            .with_organization("org-policy");

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.organization_id.as_deref(), Some("org-policy"));
        assert!(OpenAIConfig::new("key", "m").organization_id.is_none());
    }
}
