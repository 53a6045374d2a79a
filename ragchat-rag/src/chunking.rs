//! Boundary-aware document chunking.
//!
//! [`split_text`] advances a character window over the text and, where it can,
//! pulls the window's right edge back to the last sentence terminator or line
//! break so that chunks tend to end on whole sentences. [`SentenceChunker`]
//! applies it to [`Document`]s and produces [`Chunk`]s.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text, offsets and metadata.
/// Embeddings are computed later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no non-whitespace text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// A trimmed slice of some source text with its byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    /// The trimmed segment text.
    pub text: &'a str,
    /// Byte offset of the segment start in the source text.
    pub start: usize,
    /// Byte offset one past the segment end in the source text.
    pub end: usize,
}

fn is_boundary(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

fn validate_window(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
    }
    if overlap >= chunk_size {
        return Err(RagError::ConfigError(format!(
            "chunk_overlap ({overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Split `text` into overlapping, boundary-aligned segments.
///
/// `chunk_size` and `overlap` are measured in characters. A window that ends
/// before the end of the text is shortened to end just after the last `.`,
/// `!`, `?` or `\n` inside it, unless that would leave a window no longer than
/// `overlap`, in which case the hard cut is kept. Each window is trimmed and
/// whitespace-only windows are dropped. The next window starts `overlap`
/// characters before the previous one ended.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if `chunk_size == 0` or
/// `overlap >= chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<TextSegment<'_>>> {
    validate_window(chunk_size, overlap)?;

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    let byte_at = |i: usize| if i < len { chars[i].0 } else { text.len() };

    let mut segments = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + chunk_size).min(len);

        if end < len {
            let cut = (start..end).rev().find(|&i| is_boundary(chars[i].1));
            if let Some(cut) = cut {
                if cut + 1 - start > overlap {
                    end = cut + 1;
                }
            }
        }

        let window_start = byte_at(start);
        let raw = &text[window_start..byte_at(end)];
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let seg_start = window_start + (raw.len() - raw.trim_start().len());
            segments.push(TextSegment {
                text: trimmed,
                start: seg_start,
                end: seg_start + trimmed.len(),
            });
        }

        if end >= len {
            break;
        }
        start = end - overlap;
    }

    Ok(segments)
}

/// Splits documents on sentence and line boundaries with a fixed character budget.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk inherits
/// the parent document's metadata plus `document_id` and `chunk_index`.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::{Chunker, SentenceChunker};
///
/// let chunker = SentenceChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        // The window was validated in `new`, so splitting cannot fail here.
        let segments =
            split_text(&document.text, self.chunk_size, self.chunk_overlap).unwrap_or_default();

        segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut metadata = document.metadata.clone();
                metadata.document_id = Some(document.id.clone());
                metadata.chunk_index = Some(i);
                Chunk {
                    id: format!("{}_{i}", document.id),
                    document_id: document.id.clone(),
                    text: segment.text.to_string(),
                    start: segment.start,
                    end: segment.end,
                    metadata,
                }
            })
            .collect()
    }
}
