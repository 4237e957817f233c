//! Document chunking strategies.
//!
//! Provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — splits by character count with a deterministic
//!   overlap region between consecutive chunks
//! - [`RecursiveChunker`] — splits hierarchically by paragraphs, sentences,
//!   then words, keeping chunks under the size bound
//!
//! Chunking is a pure function of the document and the configuration; no
//! chunker performs I/O or fails.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text, ordinal, and metadata but
/// no embeddings; embeddings are attached later by the ingestion pipeline.
/// An empty document yields an empty `Vec`.
pub trait Chunker: Send + Sync {
    /// Split a document into an ordered sequence of chunks.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

fn make_chunk(document: &Document, ordinal: usize, text: String) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("ordinal".to_string(), ordinal.to_string());
    Chunk {
        id: Chunk::identity(&document.id, ordinal),
        text,
        embedding: Vec::new(),
        metadata,
        document_id: document.id.clone(),
        ordinal,
    }
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// Every chunk holds at most `chunk_size` characters, and each chunk after
/// the first begins `chunk_overlap` characters before the end of the
/// previous chunk, so adjacent chunks share a deterministic overlapping
/// region. Counts are Unicode scalar values, so slicing never lands inside
/// a multi-byte character.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of characters shared between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character, so windows can be taken by
        // character count without splitting a code point.
        let offsets: Vec<usize> = document.text.char_indices().map(|(i, _)| i).collect();
        let char_count = offsets.len();

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut ordinal = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let byte_start = offsets[start];
            let byte_end = if end == char_count { document.text.len() } else { offsets[end] };

            chunks.push(make_chunk(document, ordinal, document.text[byte_start..byte_end].to_string()));

            ordinal += 1;
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). If a paragraph exceeds
/// `chunk_size`, splits by sentence boundaries (`. `, `! `, `? `). If a
/// sentence still exceeds `chunk_size`, splits by word boundaries, and as a
/// last resort by raw character windows with overlap.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

const SEPARATORS: &[&str] = &["\n\n", ". ", "! ", "? ", " "];

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. Oversized segments are split again with the next-level
/// separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.chars().count() <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let rest = &separators[1..];

    // Keep the separator attached to the preceding segment so merging
    // concatenates losslessly.
    let segments: Vec<&str> = if separator == " " {
        text.split_inclusive(' ').collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut out = Vec::new();
    let mut current = String::new();

    fn flush(current: &mut String, out: &mut Vec<String>, chunk_size: usize, chunk_overlap: usize, rest: &[&str]) {
        if current.is_empty() {
            return;
        }
        if current.chars().count() > chunk_size {
            out.extend(split_and_merge(current, chunk_size, chunk_overlap, rest));
        } else {
            out.push(std::mem::take(current));
            return;
        }
        current.clear();
    }

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.chars().count() + segment.chars().count() <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut current, &mut out, chunk_size, chunk_overlap, rest);
            current = segment.to_string();
        }
    }
    flush(&mut current, &mut out, chunk_size, chunk_overlap, rest);

    out
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Character-window splitting with overlap; the fallback when no separator
/// level can keep a segment under the size bound.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    out
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, SEPARATORS)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| make_chunk(document, ordinal, text))
            .collect()
    }
}
