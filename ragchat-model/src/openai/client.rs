//! OpenAI client implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::config::OpenAIConfig;
use crate::error::{ModelError, Result};
use crate::model::ChatModel;
use crate::types::{GenerationConfig, Message};

/// [`ChatModel`] backed by the OpenAI chat completions API.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the API key or model name is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::Config("OpenAI API key must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(ModelError::Config("model name must not be empty".into()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIConfig::new(api_key, model).with_base_url(base_url))
    }
}

/// Map an HTTP status to the error kind a caller can act on.
pub(crate) fn classify_status(status: StatusCode, detail: String) -> ModelError {
    let message = format!("API returned {status}: {detail}");
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        ModelError::Transient(message)
    } else {
        ModelError::Permanent(message)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, messages: &[Message], config: &GenerationConfig) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };
        debug!(model = %self.config.model, message_count = messages.len(), "sending chat request");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body);
        if let Some(org) = &self.config.organization_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "chat request failed");
            ModelError::Transient(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!(model = %self.config.model, %status, "API error");
            return Err(classify_status(status, detail));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ModelError::MalformedResponse("response had no message content".into()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
