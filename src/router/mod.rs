//! Chunking strategy router.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunkers::{ChunkAdapter, CodeChunker, GenericChunker, MarkdownChunker, PdfChunker};
use crate::error::Result;
use crate::processing::Language;
use crate::quality::{validate_chunks, ValidationReport};
use crate::types::{Block, Chunk, ChunkerConfig, ServiceConfig, SourceDocument, SourceKind, Strategy};

/// The closed set of format adapters.
#[derive(Debug, Clone)]
pub enum Adapter {
    Code(CodeChunker),
    Markdown(MarkdownChunker),
    Pdf(PdfChunker),
    Generic(GenericChunker),
}

impl Adapter {
    /// Build the adapter for `strategy`, validating the configuration.
    ///
    /// The document is only consulted to resolve the code language.
    pub fn build(strategy: Strategy, config: ChunkerConfig, doc: &SourceDocument) -> Result<Self> {
        Ok(match strategy {
            Strategy::Code => Adapter::Code(CodeChunker::for_document(config, doc)?),
            Strategy::Markdown => Adapter::Markdown(MarkdownChunker::new(config)?),
            Strategy::Pdf => Adapter::Pdf(PdfChunker::new(config)?),
            Strategy::Generic => Adapter::Generic(GenericChunker::new(config)?),
        })
    }

    /// Description of the adapter behind a strategy.
    pub fn describe(strategy: Strategy) -> &'static str {
        match strategy {
            Strategy::Code => CodeChunker::DESCRIPTION,
            Strategy::Markdown => MarkdownChunker::DESCRIPTION,
            Strategy::Pdf => PdfChunker::DESCRIPTION,
            Strategy::Generic => GenericChunker::DESCRIPTION,
        }
    }

    fn inner(&self) -> &dyn ChunkAdapter {
        match self {
            Adapter::Code(adapter) => adapter,
            Adapter::Markdown(adapter) => adapter,
            Adapter::Pdf(adapter) => adapter,
            Adapter::Generic(adapter) => adapter,
        }
    }
}

impl ChunkAdapter for Adapter {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn strategy(&self) -> Strategy {
        self.inner().strategy()
    }

    fn config(&self) -> &ChunkerConfig {
        self.inner().config()
    }

    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block> {
        self.inner().parse_into_blocks(doc)
    }

    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        self.inner().chunk(doc)
    }

    fn description(&self) -> &'static str {
        self.inner().description()
    }
}

/// Chunks of one document together with their validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingOutcome {
    pub strategy: Strategy,
    pub chunks: Vec<Chunk>,
    pub validation: ValidationReport,
}

/// Router that selects the appropriate adapter for a document.
///
/// The router looks at the document kind first, then at the path extension,
/// and falls back to the generic adapter.
#[derive(Debug, Clone)]
pub struct ChunkingRouter {
    /// Configuration used when a request brings none
    default_config: ChunkerConfig,
}

impl ChunkingRouter {
    /// Create a new router seeded from the service defaults.
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_config(config.chunker_config())
    }

    pub fn with_config(default_config: ChunkerConfig) -> Self {
        Self { default_config }
    }

    /// Get the default chunk configuration.
    pub fn default_config(&self) -> &ChunkerConfig {
        &self.default_config
    }

    /// Pick the strategy for a document.
    pub fn select_strategy(&self, doc: &SourceDocument) -> Strategy {
        match doc.kind {
            SourceKind::Code => Strategy::Code,
            SourceKind::Markdown => Strategy::Markdown,
            SourceKind::Pdf => Strategy::Pdf,
            SourceKind::Text if !doc.pages.is_empty() => Strategy::Pdf,
            SourceKind::Text => doc
                .path
                .as_deref()
                .map(strategy_for_path)
                .unwrap_or(Strategy::Generic),
        }
    }

    /// Build the adapter for a document.
    pub fn adapter_for(
        &self,
        doc: &SourceDocument,
        strategy: Option<Strategy>,
        config: Option<ChunkerConfig>,
    ) -> Result<Adapter> {
        let strategy = strategy.unwrap_or_else(|| self.select_strategy(doc));
        let config = config.unwrap_or_else(|| self.default_config.clone());
        Adapter::build(strategy, config, doc)
    }

    /// Chunk a document and validate the result.
    ///
    /// Only configuration problems fail; validation issues are reported in
    /// the outcome.
    pub fn chunk(
        &self,
        doc: &SourceDocument,
        strategy: Option<Strategy>,
        config: Option<ChunkerConfig>,
    ) -> Result<ChunkingOutcome> {
        let adapter = self.adapter_for(doc, strategy, config)?;
        let chunks = adapter.chunk(doc);
        let validation = validate_chunks(&chunks, adapter.config().target_size);

        if !validation.is_valid {
            warn!(
                strategy = %adapter.strategy(),
                issues = validation.issues.len(),
                "Chunks failed validation"
            );
        }

        info!(
            strategy = %adapter.strategy(),
            chars = doc.content_len(),
            chunks = chunks.len(),
            "Chunked document"
        );

        Ok(ChunkingOutcome {
            strategy: adapter.strategy(),
            chunks,
            validation,
        })
    }

    /// List all available strategies.
    pub fn list_strategies(&self) -> Vec<(&'static str, &'static str)> {
        Strategy::ALL
            .iter()
            .map(|strategy| (strategy.as_str(), Adapter::describe(*strategy)))
            .collect()
    }
}

impl Default for ChunkingRouter {
    fn default() -> Self {
        Self::with_config(ChunkerConfig::default())
    }
}

/// Strategy implied by a file extension.
fn strategy_for_path(path: &str) -> Strategy {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("md" | "markdown" | "mdx") => Strategy::Markdown,
        Some("pdf") => Strategy::Pdf,
        _ if Language::from_path(path).is_some() => Strategy::Code,
        _ => Strategy::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkerError;

    #[test]
    fn test_select_by_kind() {
        let router = ChunkingRouter::default();
        assert_eq!(router.select_strategy(&SourceDocument::markdown("# hi")), Strategy::Markdown);
        assert_eq!(router.select_strategy(&SourceDocument::code("x = 1", "python")), Strategy::Code);
        assert_eq!(router.select_strategy(&SourceDocument::text("plain")), Strategy::Generic);
    }

    #[test]
    fn test_select_by_path() {
        let router = ChunkingRouter::default();
        let doc = |path: &str| SourceDocument::text("content").with_path(path);

        assert_eq!(router.select_strategy(&doc("docs/README.md")), Strategy::Markdown);
        assert_eq!(router.select_strategy(&doc("src/lib.rs")), Strategy::Code);
        assert_eq!(router.select_strategy(&doc("report.pdf")), Strategy::Pdf);
        assert_eq!(router.select_strategy(&doc("notes.txt")), Strategy::Generic);
    }

    #[test]
    fn test_chunk_with_validation() {
        let router = ChunkingRouter::with_config(ChunkerConfig::with_size(100));
        let outcome = router
            .chunk(&SourceDocument::text("Short."), None, None)
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::Generic);
        assert_eq!(outcome.chunks.len(), 1);
        assert!(!outcome.validation.is_valid);
    }

    #[test]
    fn test_configuration_error_surfaces() {
        let router = ChunkingRouter::default();
        let result = router.chunk(
            &SourceDocument::text("x"),
            Some(Strategy::Code),
            Some(ChunkerConfig::default().with_language("cobol")),
        );
        assert!(matches!(result, Err(ChunkerError::UnsupportedLanguage { .. })));
    }

    #[test]
    fn test_list_strategies() {
        let strategies = ChunkingRouter::default().list_strategies();
        let names: Vec<&str> = strategies.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["code", "markdown", "pdf", "generic"]);
    }

    #[test]
    fn test_adapter_dispatch() {
        let doc = SourceDocument::markdown("# A\n\ntext");
        let adapter = Adapter::build(Strategy::Markdown, ChunkerConfig::default(), &doc).unwrap();
        assert_eq!(adapter.name(), "markdown");
        assert_eq!(adapter.strategy(), Strategy::Markdown);
        assert_eq!(adapter.chunk(&doc).len(), 1);
    }
}
