//! Document acquisition.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use ragchat_rag::Metadata;
use tracing::{debug, warn};

use crate::error::{Result, RunnerError};

/// Resolves a document id to its text and metadata.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, id: &str) -> Result<(String, Metadata)>;
}

/// Reads UTF-8 text files; the id is a path relative to `root`.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch_document(&self, id: &str) -> Result<(String, Metadata)> {
        let path = self.root.join(id);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| RunnerError::Source {
            id: id.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;

        let mut metadata = Metadata::new();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            metadata = metadata.with_filename(name);
        }
        if let Some(stem) = path.file_stem().and_then(|n| n.to_str()) {
            metadata = metadata.with_title(stem);
        }
        debug!(document.id = id, bytes = text.len(), "read document");
        Ok((text, metadata))
    }
}

/// Retries [`RunnerError::Source`] failures of the inner source with a fixed backoff.
pub struct RetryingSource<S> {
    inner: S,
    max_retries: u32,
    backoff: Duration,
}

impl<S: DocumentSource> RetryingSource<S> {
    pub fn new(inner: S, max_retries: u32, backoff: Duration) -> Self {
        Self { inner, max_retries, backoff }
    }
}

#[async_trait]
impl<S: DocumentSource> DocumentSource for RetryingSource<S> {
    async fn fetch_document(&self, id: &str) -> Result<(String, Metadata)> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_document(id).await {
                Err(e @ RunnerError::Source { .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(document.id = id, attempt, error = %e, "fetch failed, retrying");
                    tokio::time::sleep(self.backoff).await;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DocumentSource for Flaky {
        async fn fetch_document(&self, id: &str) -> Result<(String, Metadata)> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(RunnerError::Source { id: id.into(), message: "unavailable".into() });
            }
            Ok((format!("text of {id}"), Metadata::new()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let source = RetryingSource::new(
            Flaky { failures: 2, calls: AtomicU32::new(0) },
            2,
            Duration::from_secs(1),
        );
        let (text, _) = source.fetch_document("a").await.unwrap();
        assert_eq!(text, "text of a");
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let source = RetryingSource::new(
            Flaky { failures: 5, calls: AtomicU32::new(0) },
            1,
            Duration::from_secs(1),
        );
        assert!(matches!(source.fetch_document("a").await, Err(RunnerError::Source { .. })));
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn file_source_reads_text_and_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("policy.txt"), "Policy A increases housing supply.").unwrap();

        let source = FileSource::new(dir.path());
        let (text, metadata) = source.fetch_document("policy.txt").await.unwrap();
        assert_eq!(text, "Policy A increases housing supply.");
        assert_eq!(metadata.filename.as_deref(), Some("policy.txt"));
        assert_eq!(metadata.title.as_deref(), Some("policy"));

        let err = source.fetch_document("missing.txt").await.unwrap_err();
        assert!(matches!(err, RunnerError::Source { id, .. } if id == "missing.txt"));
    }
}
