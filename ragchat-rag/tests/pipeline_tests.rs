//! Batch ingestion through the pipeline.

mod common;

use std::sync::Arc;

use common::{KeywordEmbedder, POLICY_TEXT};
use ragchat_rag::{
    Document, InMemoryVectorIndex, Metadata, RagConfig, RagError, RagPipeline, VectorIndex,
};

fn pipeline_with(embedder: KeywordEmbedder) -> RagPipeline {
    let config = RagConfig::builder()
        .chunk_size(30)
        .chunk_overlap(5)
        .ingest_concurrency(2)
        .build()
        .unwrap();
    RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .vector_index(Arc::new(InMemoryVectorIndex::new("policy_docs", 8)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn batch_ingestion_continues_past_failures() {
    let pipeline = pipeline_with(KeywordEmbedder::failing_on("BROKEN"));

    let report = pipeline
        .ingest_batch(vec![
            Document::new("policy", POLICY_TEXT),
            Document::new("blank", "   \n  "),
            Document::new("broken", "This one is BROKEN beyond repair."),
            Document::new("rates", "Policy B lowers rates."),
        ])
        .await;

    assert!(!report.is_success());
    assert_eq!(report.documents_ingested, 2);
    assert_eq!(report.documents_empty, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document_id, "broken");
    assert!(report.failures[0].reason.contains("embedding failed"));

    let count = pipeline.vector_index().count().await.unwrap();
    assert_eq!(count, report.chunks_added);
}

#[tokio::test]
async fn failed_document_leaves_no_partial_chunks() {
    let pipeline = pipeline_with(KeywordEmbedder::failing_on("BROKEN"));
    let text = "A fine opening sentence here. Then the BROKEN part arrives.";

    let err = pipeline.ingest(&Document::new("mixed", text)).await.unwrap_err();
    match err {
        RagError::IngestionError { document_id, .. } => assert_eq!(document_id, "mixed"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(pipeline.vector_index().count().await.unwrap(), 0);
}

#[tokio::test]
async fn chunks_carry_document_metadata() {
    let pipeline = pipeline_with(KeywordEmbedder::new());
    let document = Document::new("policy", POLICY_TEXT)
        .with_metadata(Metadata::new().with_filename("policy.txt").with_page_count(1));

    let ids = pipeline.ingest(&document).await.unwrap();
    assert_eq!(ids[0], "policy_0");

    let results = pipeline.search("Policy A").await.unwrap();
    let top = &results[0].metadata;
    assert_eq!(top.filename.as_deref(), Some("policy.txt"));
    assert_eq!(top.page_count, Some(1));
    assert_eq!(top.chunk_index, Some(0));
}

#[tokio::test]
async fn update_chunk_replaces_text() {
    let pipeline = pipeline_with(KeywordEmbedder::new());
    pipeline.ingest(&Document::new("policy", POLICY_TEXT)).await.unwrap();

    pipeline.update_chunk("policy_1", "Policy B lowers rates sharply.", None).await.unwrap();
    let results = pipeline.search("Policy B rates").await.unwrap();
    assert!(results.iter().any(|r| r.id == "policy_1" && r.text.contains("sharply")));

    let err = pipeline.update_chunk("missing", "text", None).await.unwrap_err();
    assert!(matches!(err, RagError::NotFound(_)));
}

#[test]
fn builder_rejects_mismatched_dimensions() {
    let result = RagPipeline::builder()
        .embedding_provider(Arc::new(KeywordEmbedder::new()))
        .vector_index(Arc::new(InMemoryVectorIndex::new("docs", 384)))
        .build();
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}

#[test]
fn builder_requires_collaborators() {
    let result = RagPipeline::builder().build();
    assert!(matches!(result, Err(RagError::ConfigError(msg)) if msg.contains("embedding_provider")));
}
