//! Data types for documents, chunks, metadata, and retrieval results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A metadata value: either free text or a number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A numeric value (page counts, file sizes, ...).
    Number(f64),
    /// A text value.
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        MetadataValue::Number(value as f64)
    }
}

/// Metadata attached to documents and chunks.
///
/// The well-known keys are typed fields; anything else goes into
/// [`extra`](Metadata::extra). Serialized as a flat JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// File name of the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// URL the source document was obtained from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of pages in the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Identifier of the parent document (set on chunks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Position of the chunk within its parent document (set on chunks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    /// Open extension map for any other key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the page count.
    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Insert an extension key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an extension key.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.extra.get(key)
    }
}

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Metadata describing where the document came from.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Metadata::default() }
    }

    /// Replace the document metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A contiguous, trimmed segment of a [`Document`].
///
/// `start` and `end` are byte offsets into the parent text, always on `char`
/// boundaries, so `&document.text[chunk.start..chunk.end] == chunk.text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Identifier of the chunk. Empty means "let the index assign one".
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Byte offset of the first character in the parent text.
    pub start: usize,
    /// Byte offset one past the last character in the parent text.
    pub end: usize,
    /// Metadata inherited from the parent document plus chunk-specific fields.
    pub metadata: Metadata,
}

/// A stored vector together with the text and metadata it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredVector {
    /// Identifier, unique within the index.
    pub id: String,
    /// The embedding.
    pub embedding: Vec<f32>,
    /// The source text.
    pub text: String,
    /// The metadata.
    pub metadata: Metadata,
}

/// A raw nearest-neighbour hit returned by a vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexHit {
    /// Identifier of the stored vector.
    pub id: String,
    /// Stored text.
    pub text: String,
    /// Stored metadata.
    pub metadata: Metadata,
    /// Cosine distance to the query, in `[0, 2]`.
    pub distance: f32,
}

/// A ranked retrieval result that passed the similarity threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Identifier of the stored chunk.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Chunk metadata.
    pub metadata: Metadata,
    /// Similarity to the query in `[0, 1]`, where 1 means identical.
    pub similarity: f32,
    /// 1-based rank among the surviving results.
    pub rank: usize,
}
