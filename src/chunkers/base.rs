//! Base trait for all format adapters.

use crate::types::{Block, Chunk, ChunkerConfig, SourceDocument, Strategy};

/// The core trait that all format adapters implement.
///
/// An adapter turns a document into ordered structural [`Block`]s and hands
/// them to the shared assembler. Configuration is validated when the adapter
/// is built, so chunking itself cannot fail.
pub trait ChunkAdapter: Send + Sync {
    /// Get the name of this adapter.
    fn name(&self) -> &'static str;

    /// The strategy recorded in chunk metadata.
    fn strategy(&self) -> Strategy;

    /// The validated configuration this adapter was built with.
    fn config(&self) -> &ChunkerConfig;

    /// Split the document into ordered blocks.
    ///
    /// Concatenating the block texts (modulo separators and whitespace)
    /// reproduces the document's content.
    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block>;

    /// Chunk the document.
    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk>;

    /// Get the description of this adapter.
    fn description(&self) -> &'static str {
        "A text chunker"
    }
}
