//! File-backed vector index.
//!
//! [`FileVectorIndex`] keeps the collection in memory and writes a JSON
//! snapshot to disk after every mutation, so a collection survives process
//! restarts. Snapshots are written to a temporary file and renamed into place.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_rag::{FileVectorIndex, VectorIndex};
//!
//! let index = FileVectorIndex::open("data/policy_docs.json", "policy_docs", 1536).await?;
//! index.add(chunks, embeddings).await?;
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::document::{Chunk, IndexHit, Metadata};
use crate::error::{RagError, Result};
use crate::inmemory::Collection;
use crate::vectorstore::VectorIndex;

const BACKEND: &str = "file";

/// A [`VectorIndex`] persisted as a JSON snapshot file.
///
/// Every mutation clones the collection and rewrites the whole snapshot, so a
/// write costs time proportional to the collection size and ingesting `n`
/// documents one at a time is quadratic. Meant for small collections of up to
/// a few thousand chunks; batch documents into fewer `add` calls for larger
/// loads.
#[derive(Debug)]
pub struct FileVectorIndex {
    path: PathBuf,
    name: String,
    dimensions: usize,
    collection: RwLock<Collection>,
}

impl FileVectorIndex {
    /// Open the snapshot at `path`, or start an empty collection if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the snapshot belongs to another
    /// collection or was written with a different dimensionality, and
    /// [`RagError::VectorStoreError`] if it cannot be read or parsed.
    pub async fn open(
        path: impl Into<PathBuf>,
        collection: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        let path = path.into();
        let name = collection.into();

        let loaded = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Collection = serde_json::from_slice(&bytes).map_err(|e| {
                    RagError::store(BACKEND, format!("invalid snapshot {}: {e}", path.display()))
                })?;
                if snapshot.name != name {
                    return Err(RagError::ConfigError(format!(
                        "snapshot {} holds collection '{}', expected '{name}'",
                        path.display(),
                        snapshot.name
                    )));
                }
                if snapshot.dimensions != dimensions {
                    return Err(RagError::ConfigError(format!(
                        "snapshot {} has dimensionality {}, expected {dimensions}",
                        path.display(),
                        snapshot.dimensions
                    )));
                }
                info!(collection = %name, count = snapshot.len(), path = %path.display(), "loaded collection");
                snapshot
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(collection = %name, path = %path.display(), "starting new collection");
                Collection::new(name.clone(), dimensions)
            }
            Err(e) => {
                return Err(RagError::store(
                    BACKEND,
                    format!("failed to read {}: {e}", path.display()),
                ));
            }
        };

        Ok(Self { path, name, dimensions, collection: RwLock::new(loaded) })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, collection: &Collection) -> Result<()> {
        let bytes = serde_json::to_vec(collection)
            .map_err(|e| RagError::store(BACKEND, format!("failed to encode snapshot: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RagError::store(BACKEND, format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let result = async {
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        result.map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to write snapshot");
            RagError::store(BACKEND, format!("failed to write {}: {e}", self.path.display()))
        })
    }

    /// Apply `op` to a copy of the collection and commit it only once the
    /// snapshot is on disk, so memory and file never disagree.
    async fn mutate<T>(&self, op: impl FnOnce(&mut Collection) -> Result<T>) -> Result<T> {
        let mut guard = self.collection.write().await;
        let mut next = guard.clone();
        let value = op(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(value)
    }
}

#[async_trait]
impl VectorIndex for FileVectorIndex {
    fn collection(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn add(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Vec<String>> {
        self.mutate(|c| c.add(chunks, embeddings)).await
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<IndexHit>> {
        self.collection.read().await.query(embedding, top_k)
    }

    async fn update(
        &self,
        id: &str,
        text: &str,
        embedding: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        self.mutate(|c| c.update(id, text, embedding, metadata)).await
    }

    async fn delete(&self, ids: &[&str]) -> Result<usize> {
        self.mutate(|c| Ok(c.delete(ids))).await
    }

    async fn delete_collection(&self) -> Result<()> {
        let mut guard = self.collection.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(RagError::store(
                    BACKEND,
                    format!("failed to remove {}: {e}", self.path.display()),
                ));
            }
        }
        guard.clear();
        info!(collection = %self.name, "deleted collection");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.collection.read().await.len())
    }
}
