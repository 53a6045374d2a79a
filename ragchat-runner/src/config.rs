//! Conversation settings.
//!
//! [`ChatConfig`] deserializes from partial JSON with defaults for every
//! missing field; [`ChatConfigBuilder`] validates before handing one out.

use std::time::Duration;

use ragchat_model::GenerationConfig;
use ragchat_session::{DEFAULT_MAX_TURNS, PromptTemplate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};

/// Settings for a [`ChatRunner`](crate::ChatRunner).
///
/// Retrieval uses two thresholds: `similarity_threshold` decides what
/// search returns, `context_threshold` decides which of those results are
/// put in front of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of results requested from the index per question.
    pub top_k: usize,
    /// Minimum similarity for a result to be returned.
    pub similarity_threshold: f32,
    /// Minimum similarity for a result to be included in the prompt.
    pub context_threshold: f32,
    /// Number of prior turns sent with each question.
    pub history_turns: usize,
    /// Number of turns kept in memory.
    pub max_history_turns: usize,
    /// Token limit and temperature for the model.
    pub generation: GenerationConfig,
    /// Deadline for one whole `converse` call.
    pub request_timeout: Duration,
    /// Extra attempts after a transient model failure.
    pub max_retries: u32,
    /// Pause between generation attempts.
    pub retry_backoff: Duration,
    /// System prompt with `{context}` and `{question}` placeholders.
    pub system_template: PromptTemplate,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.5,
            context_threshold: 0.6,
            history_turns: 10,
            max_history_turns: DEFAULT_MAX_TURNS,
            generation: GenerationConfig::default(),
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            system_template: PromptTemplate::default(),
        }
    }
}

impl ChatConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if:
    /// - `top_k == 0`
    /// - either threshold is outside `[0, 1]`
    /// - `max_history_turns < 2`
    /// - `generation.max_tokens == 0` or `generation.temperature` is outside `[0, 2]`
    /// - `request_timeout` is zero
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RunnerError::Config("top_k must be greater than zero".into()));
        }
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("context_threshold", self.context_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RunnerError::Config(format!("{name} ({value}) must be within [0, 1]")));
            }
        }
        if self.max_history_turns < 2 {
            return Err(RunnerError::Config(format!(
                "max_history_turns ({}) must be at least 2",
                self.max_history_turns
            )));
        }
        if self.generation.max_tokens == 0 {
            return Err(RunnerError::Config("max_tokens must be greater than zero".into()));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(RunnerError::Config(format!(
                "temperature ({}) must be within [0, 2]",
                self.generation.temperature
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(RunnerError::Config("request_timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Builder for a validated [`ChatConfig`].
#[derive(Debug, Clone, Default)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    /// Set the number of results per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the search threshold.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the prompt-context threshold.
    pub fn context_threshold(mut self, threshold: f32) -> Self {
        self.config.context_threshold = threshold;
        self
    }

    /// Set how many prior turns accompany each question.
    pub fn history_turns(mut self, turns: usize) -> Self {
        self.config.history_turns = turns;
        self
    }

    /// Set the stored-turn cap.
    pub fn max_history_turns(mut self, turns: usize) -> Self {
        self.config.max_history_turns = turns;
        self
    }

    /// Set the model's token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.generation.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.generation.temperature = temperature;
        self
    }

    /// Set the deadline for one `converse` call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the retry budget for transient model failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the pause between attempts.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Replace the system prompt.
    pub fn system_template(mut self, template: PromptTemplate) -> Self {
        self.config.system_template = template;
        self
    }

    /// Validate and return the config.
    ///
    /// # Errors
    ///
    /// See [`ChatConfig::validate`].
    pub fn build(self) -> Result<ChatConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
