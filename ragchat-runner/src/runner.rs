//! The conversation loop: retrieve, prompt, generate, remember.

use std::sync::Arc;

use ragchat_model::{ChatModel, Message, Role};
use ragchat_rag::{
    Document, IngestionReport, NO_RELEVANT_DOCUMENTS, RagPipeline, RetrievalResult, Retriever,
};
use ragchat_session::ConversationManager;
use serde::Serialize;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, warn};

use crate::config::ChatConfig;
use crate::error::{Result, RunnerError};
use crate::source::DocumentSource;

/// How a [`ChatRunner::converse`] call ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The model produced an answer.
    Answered,
    /// No answer was produced; `reason` is the error text.
    Failed {
        /// Why the call failed.
        reason: String,
    },
}

/// The result of one question.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    /// The question as answered, trimmed.
    pub question: String,
    /// The model's reply, or a failure notice.
    pub answer: String,
    /// The context block placed in the system prompt.
    pub used_context: String,
    /// Everything the search returned, including results below the context threshold.
    pub retrieval_results: Vec<RetrievalResult>,
    /// Name of the chat model that was asked.
    pub model: String,
    /// Whether the call produced an answer.
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ChatOutcome {
    /// Shorthand for `status == Answered`.
    pub fn is_answered(&self) -> bool {
        self.status == OutcomeStatus::Answered
    }
}

/// Summary of the indexed collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub collection: String,
    /// Number of stored segments.
    pub count: usize,
    /// Embedding dimensionality of the index.
    pub dimensions: usize,
    /// Name of the embedding model.
    pub embedding_model: String,
    /// Name of the chat model.
    pub chat_model: String,
}

/// Runner settings together with the collection summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    /// Name of the chat model.
    pub chat_model: String,
    /// Token limit per answer.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Turns currently stored in the conversation.
    pub history_len: usize,
    /// The indexed collection.
    pub collection: CollectionInfo,
}

/// Answers questions from an indexed collection while keeping a bounded
/// conversation history.
///
/// The pipeline (and the index behind it) can be shared between runners;
/// each runner owns its own conversation.
///
/// # Example
///
/// ```rust,ignore
/// let mut runner = ChatRunner::builder()
///     .pipeline(pipeline)
///     .model(Arc::new(OpenAIChatModel::new(OpenAIConfig::from_env()?)?))
///     .build()?;
///
/// let outcome = runner.converse("What does Policy A do?").await;
/// println!("{}", outcome.answer);
/// ```
pub struct ChatRunner {
    pipeline: Arc<RagPipeline>,
    model: Arc<dyn ChatModel>,
    conversation: ConversationManager,
    config: ChatConfig,
}

impl ChatRunner {
    /// Start building a runner.
    pub fn builder() -> ChatRunnerBuilder {
        ChatRunnerBuilder::default()
    }

    /// The active settings.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The ingestion and retrieval pipeline.
    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.pipeline
    }

    /// The stored conversation.
    pub fn conversation(&self) -> &ConversationManager {
        &self.conversation
    }

    /// Answer `question` from the collection.
    ///
    /// Never fails: retrieval errors fall back to the no-documents context,
    /// and generation errors or an expired `request_timeout` produce a
    /// [`OutcomeStatus::Failed`] outcome with a notice as the answer. The
    /// conversation only records the exchange when an answer was generated.
    pub async fn converse(&mut self, question: &str) -> ChatOutcome {
        let question = question.trim();
        let timeout = self.config.request_timeout;
        let deadline = Instant::now() + timeout;

        if question.is_empty() {
            return self.failed(question, String::new(), Vec::new(), RunnerError::EmptyQuestion);
        }

        let Ok((retrieval_results, used_context)) =
            timeout_at(deadline, self.retrieve(question)).await
        else {
            let context = NO_RELEVANT_DOCUMENTS.to_string();
            return self.failed(question, context, Vec::new(), RunnerError::GenerationTimeout(timeout));
        };

        let messages = self.conversation.build_messages(
            &self.config.system_template,
            &used_context,
            question,
            self.config.history_turns,
        );

        let generated = timeout_at(deadline, self.generate(&messages))
            .await
            .unwrap_or(Err(RunnerError::GenerationTimeout(timeout)));

        let answer = match generated {
            Ok(answer) => answer,
            Err(e) => return self.failed(question, used_context, retrieval_results, e),
        };

        if let Err(e) = self.remember(question, &answer) {
            return self.failed(question, used_context, retrieval_results, e);
        }

        info!(
            result_count = retrieval_results.len(),
            answer_len = answer.len(),
            history_len = self.conversation.len(),
            "answered question"
        );
        ChatOutcome {
            question: question.to_string(),
            answer,
            used_context,
            retrieval_results,
            model: self.model.name().to_string(),
            status: OutcomeStatus::Answered,
        }
    }

    /// Search, then build the context from results at or above `context_threshold`.
    async fn retrieve(&self, question: &str) -> (Vec<RetrievalResult>, String) {
        let search = self.pipeline.retriever().search(
            question,
            self.config.top_k,
            self.config.similarity_threshold,
        );
        match search.await {
            Ok(results) => {
                let in_context: Vec<RetrievalResult> = results
                    .iter()
                    .filter(|r| r.similarity >= self.config.context_threshold)
                    .cloned()
                    .collect();
                debug!(
                    result_count = results.len(),
                    context_count = in_context.len(),
                    "retrieved context"
                );
                (results, Retriever::build_context(&in_context))
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without documents");
                (Vec::new(), NO_RELEVANT_DOCUMENTS.to_string())
            }
        }
    }

    /// Call the model, retrying transient failures with a fixed backoff.
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.model.generate(messages, &self.config.generation).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(model = self.model.name(), attempt, error = %e, "generation failed, retrying");
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn remember(&mut self, question: &str, answer: &str) -> Result<()> {
        self.conversation.append(Role::User, question)?;
        self.conversation.append(Role::Assistant, answer)?;
        Ok(())
    }

    fn failed(
        &self,
        question: &str,
        used_context: String,
        retrieval_results: Vec<RetrievalResult>,
        error: RunnerError,
    ) -> ChatOutcome {
        error!(model = self.model.name(), error = %error, "could not answer question");
        let reason = error.to_string();
        ChatOutcome {
            question: question.to_string(),
            answer: failure_notice(&reason),
            used_context,
            retrieval_results,
            model: self.model.name().to_string(),
            status: OutcomeStatus::Failed { reason },
        }
    }

    /// Drop the conversation history.
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        info!("conversation history cleared");
    }

    /// Describe the collection: name, size, dimensionality and models.
    ///
    /// # Errors
    ///
    /// Returns the index error if the count cannot be read.
    pub async fn collection_info(&self) -> Result<CollectionInfo> {
        let index = self.pipeline.vector_index();
        Ok(CollectionInfo {
            collection: index.collection().to_string(),
            count: index.count().await?,
            dimensions: index.dimensions(),
            embedding_model: self.pipeline.embedding_provider().model_name().to_string(),
            chat_model: self.model.name().to_string(),
        })
    }

    /// Model settings, history length and the collection summary.
    ///
    /// # Errors
    ///
    /// See [`ChatRunner::collection_info`].
    pub async fn system_info(&self) -> Result<SystemInfo> {
        Ok(SystemInfo {
            chat_model: self.model.name().to_string(),
            max_tokens: self.config.generation.max_tokens,
            temperature: self.config.generation.temperature,
            history_len: self.conversation.len(),
            collection: self.collection_info().await?,
        })
    }

    /// Remove every stored vector from the collection.
    ///
    /// # Errors
    ///
    /// Returns the index error.
    pub async fn delete_collection(&self) -> Result<()> {
        self.pipeline.vector_index().delete_collection().await?;
        info!(collection = self.pipeline.vector_index().collection(), "collection deleted");
        Ok(())
    }

    /// Fetch `ids` from `source` and ingest them; fetch failures are
    /// reported next to ingestion failures.
    pub async fn ingest_from_source(
        &self,
        source: &dyn DocumentSource,
        ids: &[&str],
    ) -> IngestionReport {
        crate::ingest::ingest_from_source(&self.pipeline, source, ids).await
    }

    /// Ingest documents that are already in memory.
    pub async fn ingest(&self, documents: Vec<Document>) -> IngestionReport {
        self.pipeline.ingest_batch(documents).await
    }
}

/// Text shown in place of an answer when generation fails.
pub fn failure_notice(reason: &str) -> String {
    format!("Sorry, an error occurred while generating the answer: {reason}")
}

/// Builder for a [`ChatRunner`].
#[derive(Default)]
pub struct ChatRunnerBuilder {
    pipeline: Option<Arc<RagPipeline>>,
    model: Option<Arc<dyn ChatModel>>,
    config: Option<ChatConfig>,
}

impl ChatRunnerBuilder {
    /// Set the pipeline (required).
    pub fn pipeline(mut self, pipeline: Arc<RagPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the chat model (required).
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the config; defaults apply otherwise.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the config and assemble the runner.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the pipeline or model is missing
    /// or the config is invalid.
    pub fn build(self) -> Result<ChatRunner> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let pipeline =
            self.pipeline.ok_or_else(|| RunnerError::Config("pipeline is required".into()))?;
        let model = self.model.ok_or_else(|| RunnerError::Config("model is required".into()))?;
        let conversation = ConversationManager::new(config.max_history_turns)?;
        Ok(ChatRunner { pipeline, model, conversation, config })
    }
}
