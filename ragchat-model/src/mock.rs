//! Scripted chat model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::model::ChatModel;
use crate::types::{GenerationConfig, Message};

/// A [`ChatModel`] that replays scripted replies and records every request.
///
/// Once the script runs out, the fallback reply is returned.
///
/// # Example
///
/// ```rust
/// use ragchat_model::{ChatModel, GenerationConfig, Message, MockLlm, ModelError};
///
/// # tokio_test_block_on(async {
/// let model = MockLlm::new("mock")
///     .with_failure(ModelError::Transient("busy".into()))
///     .with_response("Policy A increases supply.");
/// assert!(model.generate(&[Message::user("hi")], &GenerationConfig::default()).await.is_err());
/// assert_eq!(model.call_count(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct MockLlm {
    name: String,
    script: Mutex<VecDeque<Result<String>>>,
    fallback: String,
    delay: Option<Duration>,
    requests: Mutex<Vec<(Vec<Message>, GenerationConfig)>>,
}

impl MockLlm {
    /// A mock named `name` with an empty script.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            fallback: "mock response".to_string(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: ModelError) -> Self {
        self.push(Err(error));
        self
    }

    /// Reply returned once the script is exhausted.
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = response.into();
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Messages of every request received so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.lock_requests().iter().map(|(messages, _)| messages.clone()).collect()
    }

    /// Generation config of the most recent request.
    pub fn last_config(&self) -> Option<GenerationConfig> {
        self.lock_requests().last().map(|(_, config)| *config)
    }

    /// Number of `generate` calls received.
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    fn push(&self, entry: Result<String>) {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).push_back(entry);
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<(Vec<Message>, GenerationConfig)>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ChatModel for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, messages: &[Message], config: &GenerationConfig) -> Result<String> {
        self.lock_requests().push((messages.to_vec(), *config));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
