//! Generic text adapter over a separator hierarchy.

use tracing::debug;

use super::assembler::{ChunkAssembler, ContextInjection};
use super::base::ChunkAdapter;
use super::splitter::{RecursiveSplitter, Separator};
use crate::error::Result;
use crate::types::{Block, Chunk, ChunkerConfig, SourceDocument, Strategy};

const NAME: &str = "generic";

/// Recursive chunker for text with no exploitable structure.
///
/// This chunker tries multiple split points in order of preference:
/// 1. Double newlines (paragraphs)
/// 2. Single newlines
/// 3. Sentence endings (. ! ?)
/// 4. Semicolons and commas
/// 5. Spaces (words)
/// 6. Characters (last resort)
///
/// A custom hierarchy from [`ChunkerConfig::separators`] replaces the list.
/// Unlike the structural adapters it honours `overlap`.
#[derive(Debug, Clone)]
pub struct GenericChunker {
    config: ChunkerConfig,
    splitter: RecursiveSplitter,
}

impl GenericChunker {
    pub const DESCRIPTION: &'static str = "Hierarchically splits text using multiple separator levels";

    /// Create a new generic adapter.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        let config = config.validated(NAME)?;
        let splitter = match &config.separators {
            Some(custom) => RecursiveSplitter::new(custom.iter().map(|s| Separator::from(s.as_str())).collect()),
            None => RecursiveSplitter::default(),
        };

        Ok(Self { config, splitter })
    }

    pub fn separators(&self) -> &[Separator] {
        self.splitter.separators()
    }

    /// Room left for fresh text once the overlap is carried over.
    fn budget(&self) -> usize {
        let reserved = if self.config.overlap > 0 { self.config.overlap + 1 } else { 0 };
        self.config.target_size.saturating_sub(reserved).max(1)
    }
}

impl ChunkAdapter for GenericChunker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn strategy(&self) -> Strategy {
        Strategy::Generic
    }

    fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block> {
        self.splitter
            .split(&doc.content, self.budget())
            .into_iter()
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| Block::new(segment, "text"))
            .collect()
    }

    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        let blocks = self.parse_into_blocks(doc);
        let mut chunks = ChunkAssembler::new(Strategy::Generic, self.config.target_size, self.splitter.separators())
            .with_context(ContextInjection::TrailingOverlap(self.config.overlap))
            .assemble(blocks);

        for chunk in &mut chunks {
            chunk.metadata.path = doc.path.clone();
        }

        debug!(
            target_size = self.config.target_size,
            overlap = self.config.overlap,
            chunks = chunks.len(),
            "Chunked text"
        );
        chunks
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_small_text() {
        let chunker = GenericChunker::new(ChunkerConfig::with_size(100)).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text("Hello, world!"));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello, world!");
        assert_eq!(chunks[0].metadata.block_kinds, vec!["text"]);
    }

    #[test]
    fn test_paragraph_splitting() {
        let content = "This is paragraph one.\n\nThis is paragraph two.\n\nThis is paragraph three.";
        let chunker = GenericChunker::new(ChunkerConfig::with_size(30)).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text(content));

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["This is paragraph one.", "This is paragraph two.", "This is paragraph three."]
        );
    }

    #[test]
    fn test_sentence_splitting() {
        let content = "First sentence. Second sentence. Third sentence. Fourth sentence.";
        let chunker = GenericChunker::new(ChunkerConfig::with_size(20)).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text(content));

        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.size <= 20));
        assert!(chunks.iter().all(|c| c.text.ends_with('.')));
    }

    #[test]
    fn test_custom_separators() {
        let config = ChunkerConfig::with_size(6).with_separators([" ", ""]);
        let chunker = GenericChunker::new(config).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text("word1 word2 word3"));

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["word1", "word2", "word3"]);
        assert_eq!(texts.join(" "), "word1 word2 word3");
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let content = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunker = GenericChunker::new(ChunkerConfig::with_size(30).with_overlap(10)).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text(content));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.size <= 30));
        assert_eq!(chunks[0].text, "alpha beta gamma");
        assert_eq!(chunks[1].text, "beta gamma delta epsilon zeta");
        assert!(chunks[2].text.starts_with("zeta eta theta"));
    }

    #[test]
    fn test_rejects_overlap_at_target() {
        assert!(GenericChunker::new(ChunkerConfig::with_size(10).with_overlap(10)).is_err());
    }

    #[test]
    fn test_empty_document() {
        let chunker = GenericChunker::new(ChunkerConfig::default()).unwrap();
        assert!(chunker.chunk(&SourceDocument::text("")).is_empty());
        assert!(chunker.chunk(&SourceDocument::text("  \n\n ")).is_empty());
    }
}
