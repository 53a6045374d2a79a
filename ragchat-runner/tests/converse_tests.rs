//! End-to-end conversations against a stub embedder and a scripted model.

#[path = "../../ragchat-rag/tests/common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use ragchat_model::{MockLlm, ModelError, Role};
use ragchat_rag::{
    Document, InMemoryVectorIndex, NO_RELEVANT_DOCUMENTS, RagConfig, RagPipeline,
};
use ragchat_runner::{
    ChatConfig, ChatRunner, FileSource, OutcomeStatus, RetryingSource, RunnerError,
};
use ragchat_telemetry::EventCapture;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use common::{KeywordEmbedder, POLICY_TEXT};

fn pipeline(embedder: KeywordEmbedder) -> Arc<RagPipeline> {
    let config = RagConfig::builder().chunk_size(30).chunk_overlap(5).build().unwrap();
    Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(embedder))
            .vector_index(Arc::new(InMemoryVectorIndex::new("policy_docs", 8)))
            .build()
            .unwrap(),
    )
}

fn chat_config() -> ChatConfig {
    ChatConfig::builder()
        .context_threshold(0.5)
        .retry_backoff(Duration::from_millis(100))
        .build()
        .unwrap()
}

async fn runner_with(model: Arc<MockLlm>) -> ChatRunner {
    let runner = ChatRunner::builder()
        .pipeline(pipeline(KeywordEmbedder::new()))
        .model(model)
        .config(chat_config())
        .build()
        .unwrap();
    let report = runner.ingest(vec![Document::new("policy", POLICY_TEXT)]).await;
    assert!(report.is_success());
    runner
}

#[tokio::test]
async fn answers_from_retrieved_context() {
    let model = Arc::new(MockLlm::new("mock-gpt").with_response("It increases housing supply."));
    let mut runner = runner_with(model.clone()).await;

    let outcome = runner.converse("What does Policy A do?").await;

    assert!(outcome.is_answered());
    assert_eq!(outcome.answer, "It increases housing supply.");
    assert_eq!(outcome.model, "mock-gpt");
    assert_eq!(outcome.retrieval_results.len(), 1);
    assert!(outcome.used_context.contains("Policy A increases housing"));

    let request = &model.requests()[0];
    assert_eq!(request.len(), 2);
    assert_eq!(request[0].role, Role::System);
    assert!(request[0].content.contains(&outcome.used_context));
    assert!(request[0].content.contains("What does Policy A do?"));
    assert_eq!(request[1].content, "What does Policy A do?");
    assert_eq!(model.last_config().unwrap().max_tokens, 1000);

    let turns: Vec<(Role, &str)> =
        runner.conversation().turns().map(|t| (t.role, t.content.as_str())).collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "What does Policy A do?"),
            (Role::Assistant, "It increases housing supply.")
        ]
    );
}

#[tokio::test]
async fn history_is_sent_with_follow_up_questions() {
    let model = Arc::new(MockLlm::new("mock").with_response("first").with_response("second"));
    let mut runner = runner_with(model.clone()).await;

    runner.converse("What does Policy A do?").await;
    runner.converse("And Policy B?").await;

    let second = &model.requests()[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[1].content, "What does Policy A do?");
    assert_eq!(second[2].content, "first");
    assert_eq!(second[3].content, "And Policy B?");
    assert_eq!(runner.conversation().len(), 4);
}

#[tokio::test]
async fn permanent_failure_leaves_history_untouched() {
    let model = Arc::new(
        MockLlm::new("mock")
            .with_response("first")
            .with_failure(ModelError::Permanent("invalid api key".into())),
    );
    let mut runner = runner_with(model.clone()).await;
    runner.converse("What does Policy A do?").await;
    let before = runner.conversation().recent_turns(100).len();

    let outcome = runner.converse("And Policy B?").await;

    assert!(!outcome.is_answered());
    assert!(outcome.answer.starts_with("Sorry, an error occurred"));
    assert!(outcome.answer.contains("invalid api key"));
    assert!(matches!(&outcome.status, OutcomeStatus::Failed { reason } if reason.contains("invalid api key")));
    assert_eq!(runner.conversation().recent_turns(100).len(), before);
    assert_eq!(model.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let model = Arc::new(
        MockLlm::new("mock")
            .with_failure(ModelError::Transient("rate limited".into()))
            .with_failure(ModelError::Transient("rate limited".into()))
            .with_response("finally"),
    );
    let mut runner = runner_with(model.clone()).await;

    let outcome = runner.converse("What does Policy A do?").await;
    assert!(outcome.is_answered());
    assert_eq!(outcome.answer, "finally");
    assert_eq!(model.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn retries_are_bounded() {
    let model = Arc::new(
        MockLlm::new("mock")
            .with_failure(ModelError::Transient("503".into()))
            .with_failure(ModelError::Transient("503".into()))
            .with_failure(ModelError::Transient("503".into()))
            .with_response("too late"),
    );
    let mut runner = runner_with(model.clone()).await;

    let outcome = runner.converse("What does Policy A do?").await;
    assert!(!outcome.is_answered());
    assert_eq!(model.call_count(), 3);
    assert!(runner.conversation().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_model_times_out_without_mutation() {
    let model = Arc::new(MockLlm::new("mock").with_delay(Duration::from_secs(120)));
    let config = ChatConfig::builder()
        .context_threshold(0.5)
        .request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let mut runner = ChatRunner::builder()
        .pipeline(pipeline(KeywordEmbedder::new()))
        .model(model)
        .config(config)
        .build()
        .unwrap();

    let outcome = runner.converse("What does Policy A do?").await;
    let expected = RunnerError::GenerationTimeout(Duration::from_secs(5)).to_string();
    assert_eq!(outcome.status, OutcomeStatus::Failed { reason: expected });
    assert!(runner.conversation().is_empty());
}

#[tokio::test]
async fn empty_collection_uses_sentinel_context() {
    let model = Arc::new(MockLlm::new("mock").with_response("I don't know."));
    let mut runner =
        ChatRunner::builder().pipeline(pipeline(KeywordEmbedder::new())).model(model.clone()).build().unwrap();

    let outcome = runner.converse("What does Policy A do?").await;
    assert!(outcome.is_answered());
    assert!(outcome.retrieval_results.is_empty());
    assert_eq!(outcome.used_context, NO_RELEVANT_DOCUMENTS);
    assert!(model.requests()[0][0].content.contains(NO_RELEVANT_DOCUMENTS));
}

#[tokio::test]
async fn low_similarity_results_stay_out_of_context() {
    let model = Arc::new(MockLlm::new("mock"));
    let mut runner = ChatRunner::builder()
        .pipeline(pipeline(KeywordEmbedder::new()))
        .model(model)
        .config(ChatConfig::builder().similarity_threshold(0.5).context_threshold(0.9).build().unwrap())
        .build()
        .unwrap();
    runner.ingest(vec![Document::new("policy", POLICY_TEXT)]).await;

    let outcome = runner.converse("What does Policy A do?").await;
    assert_eq!(outcome.retrieval_results.len(), 1);
    assert_eq!(outcome.used_context, NO_RELEVANT_DOCUMENTS);
}

#[tokio::test]
async fn retrieval_failure_degrades_to_sentinel() {
    let capture = EventCapture::new();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let model = Arc::new(MockLlm::new("mock").with_response("answer without documents"));
    let mut runner = ChatRunner::builder()
        .pipeline(pipeline(KeywordEmbedder::failing_on("Policy A")))
        .model(model)
        .build()
        .unwrap();

    let outcome = runner.converse("What does Policy A do?").await;
    assert!(outcome.is_answered());
    assert_eq!(outcome.used_context, NO_RELEVANT_DOCUMENTS);
    assert_eq!(capture.find(Level::WARN, "retrieval failed").len(), 1);
}

#[tokio::test]
async fn blank_question_is_not_sent() {
    let model = Arc::new(MockLlm::new("mock"));
    let mut runner = runner_with(model.clone()).await;

    let outcome = runner.converse("   ").await;
    assert!(!outcome.is_answered());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn administrative_operations() {
    let model = Arc::new(MockLlm::new("mock-gpt").with_response("ok"));
    let mut runner = runner_with(model).await;
    runner.converse("What does Policy A do?").await;

    let info = runner.collection_info().await.unwrap();
    assert_eq!(info.collection, "policy_docs");
    assert_eq!(info.dimensions, 8);
    assert_eq!(info.embedding_model, "keyword");
    assert_eq!(info.chat_model, "mock-gpt");
    assert!(info.count > 1);

    let system = runner.system_info().await.unwrap();
    assert_eq!(system.history_len, 2);
    assert_eq!(system.max_tokens, 1000);
    assert_eq!(system.collection, info);

    runner.clear_conversation();
    assert!(runner.conversation().is_empty());

    runner.delete_collection().await.unwrap();
    assert_eq!(runner.collection_info().await.unwrap().count, 0);
}

#[tokio::test]
async fn builder_requires_model() {
    let result = ChatRunner::builder().pipeline(pipeline(KeywordEmbedder::new())).build();
    assert!(matches!(result, Err(RunnerError::Config(_))));
}

#[tokio::test]
async fn ingests_files_and_reports_missing_ones() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("policy.txt"), POLICY_TEXT).unwrap();

    let runner = ChatRunner::builder()
        .pipeline(pipeline(KeywordEmbedder::new()))
        .model(Arc::new(MockLlm::new("mock")))
        .build()
        .unwrap();
    let source = RetryingSource::new(FileSource::new(dir.path()), 0, Duration::ZERO);

    let report = runner.ingest_from_source(&source, &["policy.txt", "missing.txt"]).await;
    assert_eq!(report.documents_ingested, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document_id, "missing.txt");

    let info = runner.collection_info().await.unwrap();
    assert_eq!(info.count, report.chunks_added);
}
