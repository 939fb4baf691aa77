//! Chunk type definitions.

use serde::{Deserialize, Serialize};

use super::Strategy;

/// A chunk of content emitted by an adapter.
///
/// Chunks are the fundamental unit of content that gets embedded and indexed.
/// They are immutable once emitted and owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Final assembled text (trimmed), including any injected context
    pub text: String,

    /// Order of this chunk within its document (0-indexed)
    pub sequence_id: usize,

    /// Number of characters in `text`
    pub size: usize,

    /// Adapter that produced this chunk
    pub strategy: Strategy,

    /// Adapter-specific metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk; `size` is derived from the text.
    pub fn new(text: String, sequence_id: usize, strategy: Strategy, metadata: ChunkMetadata) -> Self {
        let size = text.chars().count();
        Self {
            text,
            sequence_id,
            size,
            strategy,
            metadata,
        }
    }

    /// Get the length of the chunk text in characters.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Metadata associated with a chunk.
///
/// `strategy` and `chunk_size` are always present; the remaining fields are
/// filled by the adapters they apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Adapter name
    pub strategy: Strategy,

    /// Target size the chunk was assembled against
    pub chunk_size: usize,

    /// Distinct block kinds present, in order of first appearance
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_kinds: Vec<String>,

    /// Language of the content (for code: "rust", "python")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Source file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Ancestor headings, outermost first (markdown)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    /// The section's own heading line (markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Line numbers in the original text (start, end), 1-based inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<(usize, usize)>,

    /// Page number when the chunk comes from a single page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    /// Inclusive page range covered by the chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_range: Option<(usize, usize)>,

    /// Index of this chunk among the pieces of a split page or section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_chunk: Option<usize>,

    /// Additional arbitrary metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl ChunkMetadata {
    pub fn new(strategy: Strategy, chunk_size: usize) -> Self {
        Self {
            strategy,
            chunk_size,
            block_kinds: Vec::new(),
            language: None,
            path: None,
            headers: Vec::new(),
            section: None,
            line_range: None,
            page: None,
            page_range: None,
            sub_chunk: None,
            extra: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_counts_chars() {
        let chunk = Chunk::new("héllo".to_string(), 0, Strategy::Generic, ChunkMetadata::new(Strategy::Generic, 10));
        assert_eq!(chunk.size, 5);
    }

    #[test]
    fn test_serialized_shape() {
        let chunk = Chunk::new("text".to_string(), 3, Strategy::Pdf, ChunkMetadata::new(Strategy::Pdf, 150));
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["sequence_id"], 3);
        assert_eq!(value["strategy"], "pdf");
        assert_eq!(value["metadata"]["strategy"], "pdf");
        assert_eq!(value["metadata"]["chunk_size"], 150);
        assert!(value["metadata"].get("headers").is_none());
    }
}
