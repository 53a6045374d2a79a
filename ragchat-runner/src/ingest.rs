//! Ingestion from a [`DocumentSource`].
//!
//! Documents are fetched concurrently, bounded by the pipeline's
//! `ingest_concurrency`; failed fetches are merged into the ingestion report.

use futures::stream::{self, StreamExt};
use ragchat_rag::{Document, IngestionReport, RagPipeline};
use tracing::warn;

use crate::source::DocumentSource;

/// Fetch every id concurrently, then hand the fetched documents to the pipeline.
pub async fn ingest_from_source(
    pipeline: &RagPipeline,
    source: &dyn DocumentSource,
    ids: &[&str],
) -> IngestionReport {
    let fetched: Vec<(String, _)> = stream::iter(ids.iter().copied())
        .map(|id| async move { (id.to_string(), source.fetch_document(id).await) })
        .buffer_unordered(pipeline.config().ingest_concurrency)
        .collect()
        .await;

    let mut documents = Vec::with_capacity(fetched.len());
    let mut fetch_failures = Vec::new();
    for (id, result) in fetched {
        match result {
            Ok((text, metadata)) => documents.push(Document::new(id, text).with_metadata(metadata)),
            Err(e) => {
                warn!(document.id = %id, error = %e, "could not fetch document");
                fetch_failures.push((id, e.to_string()));
            }
        }
    }

    let mut report = pipeline.ingest_batch(documents).await;
    for (id, reason) in fetch_failures {
        report.record_failure(id, reason);
    }
    report
}
