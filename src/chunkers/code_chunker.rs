//! Code adapter: import-aware splitting along language boundaries.
//!
//! The file's leading import preamble is extracted once and injected into
//! every chunk, so each chunk carries the names it refers to. The body is
//! split with the language's separator hierarchy (classes, then functions,
//! then blank lines and lines) and each piece is labelled by the language's
//! classification rules.

use regex::Regex;
use tracing::{debug, warn};

use super::assembler::{preamble_fits, ChunkAssembler, ContextInjection, PREAMBLE_JOINER};
use super::base::ChunkAdapter;
use super::classifier::BlockClassifier;
use super::splitter::{char_len, segment_lines, RecursiveSplitter};
use crate::error::{ChunkerError, Result};
use crate::processing::language::{Language, LanguageRules, LINE_SEPARATORS};
use crate::types::{Block, Chunk, ChunkerConfig, SourceDocument, Strategy};

const NAME: &str = "code";

/// Recognises the import preamble of one language.
#[derive(Debug, Clone)]
struct ImportScanner {
    imports: Vec<Regex>,
    groups: Vec<(Regex, Regex)>,
    comment_prefixes: &'static [&'static str],
}

impl ImportScanner {
    fn new(rules: &LanguageRules) -> Result<Self> {
        let imports = rules
            .imports
            .iter()
            .map(|pattern| compile("import", pattern))
            .collect::<Result<Vec<_>>>()?;

        let groups = rules
            .import_groups
            .iter()
            .map(|group| Ok((compile("import-group", group.opens)?, compile("import-group", group.closes)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            imports,
            groups,
            comment_prefixes: rules.comment_prefixes,
        })
    }

    fn is_import(&self, line: &str) -> bool {
        self.imports.iter().any(|re| re.is_match(line))
    }

    fn is_comment(&self, line: &str) -> bool {
        self.comment_prefixes.iter().any(|prefix| line.starts_with(prefix))
    }

    /// Byte offset where the preamble ends and the number of lines it spans.
    ///
    /// Scanning stops at the first line that is neither an import, a comment
    /// nor blank; an open import group only ends at its closing line.
    fn preamble_end(&self, text: &str) -> (usize, usize) {
        let mut offset = 0;
        let mut end = (0, 0);
        let mut open_group: Option<&Regex> = None;

        for (idx, raw) in text.split_inclusive('\n').enumerate() {
            let line = raw.trim();
            offset += raw.len();

            if let Some(closes) = open_group {
                if closes.is_match(line) {
                    open_group = None;
                }
                end = (offset, idx + 1);
                continue;
            }

            if line.is_empty() || self.is_comment(line) {
                continue;
            }

            if !self.is_import(line) {
                break;
            }

            open_group = self
                .groups
                .iter()
                .find(|(opens, closes)| opens.is_match(line) && !closes.is_match(line))
                .map(|(_, closes)| closes);
            end = (offset, idx + 1);
        }

        // An unterminated group is not an import block
        if open_group.is_some() {
            return (0, 0);
        }
        end
    }
}

fn compile(label: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ChunkerError::InvalidPattern {
        label: label.to_string(),
        source,
    })
}

/// Code adapter bound to one language.
#[derive(Debug, Clone)]
pub struct CodeChunker {
    config: ChunkerConfig,
    language: Language,
    splitter: RecursiveSplitter,
    classifier: BlockClassifier,
    imports: ImportScanner,
}

impl CodeChunker {
    pub const DESCRIPTION: &'static str = "Splits source code on class and function boundaries, carrying the import preamble";

    /// Create a code adapter for `config.language`.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        let config = config.validated(NAME)?;
        let tag = config.language.clone().unwrap_or_default();
        let language = Language::from_tag(&tag).ok_or_else(|| unsupported(&tag, &config))?;
        Self::build(language, config)
    }

    /// Create a code adapter for a document.
    ///
    /// The language comes from the config, then the document's declared
    /// language, then its path extension, then a shebang line.
    pub fn for_document(config: ChunkerConfig, doc: &SourceDocument) -> Result<Self> {
        let config = config.validated(NAME)?;

        let language = match config.language.as_deref().or(doc.language.as_deref()) {
            Some(tag) => Language::from_tag(tag).ok_or_else(|| unsupported(tag, &config))?,
            None => doc
                .path
                .as_deref()
                .and_then(Language::from_path)
                .or_else(|| Language::from_shebang(&doc.content))
                .ok_or_else(|| unsupported(doc.path.as_deref().unwrap_or("unknown"), &config))?,
        };

        Self::build(language, config)
    }

    fn build(language: Language, config: ChunkerConfig) -> Result<Self> {
        let rules = language.rules();
        let splitter = if config.preserve_functions {
            RecursiveSplitter::from_table(rules.separators)
        } else {
            RecursiveSplitter::from_table(LINE_SEPARATORS)
        };

        Ok(Self {
            classifier: BlockClassifier::new(rules.block_rules)?,
            imports: ImportScanner::new(rules)?,
            splitter,
            language,
            config,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The leading import preamble of `text`, if any.
    pub fn extract_imports<'a>(&self, text: &'a str) -> Option<&'a str> {
        let (end, _) = self.imports.preamble_end(text);
        let preamble = text[..end].trim();
        (!preamble.is_empty()).then_some(preamble)
    }

    /// Injected preamble, the body to split and the line the body starts on.
    fn layout<'a>(&self, text: &'a str) -> (Option<&'a str>, &'a str, usize) {
        if !self.config.include_imports {
            return (None, text, 1);
        }

        let (end, lines) = self.imports.preamble_end(text);
        let preamble = text[..end].trim();
        let body = &text[end..];

        if preamble.is_empty() || body.trim().is_empty() {
            return (None, text, 1);
        }

        if !preamble_fits(self.config.target_size, preamble) {
            warn!(
                language = %self.language,
                preamble = char_len(preamble),
                target_size = self.config.target_size,
                "Import preamble too large to inject, chunking it with the body"
            );
            return (None, text, 1);
        }

        (Some(preamble), body, lines + 1)
    }

    fn blocks_for<'a>(&self, text: &'a str) -> (Option<&'a str>, Vec<Block>) {
        let (preamble, body, first_line) = self.layout(text);
        let cost = preamble
            .map(|p| char_len(p) + char_len(PREAMBLE_JOINER))
            .unwrap_or(0);
        let budget = self.config.target_size.saturating_sub(cost).max(1);

        let segments = self.splitter.split(body, budget);
        let lines = segment_lines(body, &segments, first_line);

        // Classify each item on its own so a packed segment reports every kind
        let mut blocks = Vec::new();
        for (segment, line) in segments.iter().zip(lines) {
            let pieces = self.splitter.boundaries(segment);
            let piece_lines = segment_lines(segment, &pieces, line);

            for (piece, line) in pieces.into_iter().zip(piece_lines) {
                if piece.trim().is_empty() {
                    continue;
                }
                let text = piece.trim_start_matches('\n');
                let skipped = piece.len() - text.len();
                let kind = self.classifier.classify(text);
                blocks.push(Block::new(text, kind).at_line(line + skipped));
            }
        }

        (preamble, blocks)
    }
}

fn unsupported(language: &str, config: &ChunkerConfig) -> ChunkerError {
    ChunkerError::UnsupportedLanguage {
        adapter: NAME,
        language: language.to_string(),
        target_size: config.target_size,
        overlap: config.overlap,
    }
}

impl ChunkAdapter for CodeChunker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn strategy(&self) -> Strategy {
        Strategy::Code
    }

    fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block> {
        self.blocks_for(&doc.content).1
    }

    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        let (preamble, blocks) = self.blocks_for(&doc.content);
        let context = match preamble {
            Some(preamble) => ContextInjection::Fixed(preamble.to_string()),
            None => ContextInjection::None,
        };

        let mut chunks = ChunkAssembler::new(Strategy::Code, self.config.target_size, self.splitter.separators())
            .with_joiner("\n")
            .with_context(context)
            .with_line_ranges()
            .assemble(blocks);

        for chunk in &mut chunks {
            chunk.metadata.language = Some(self.language.to_string());
            chunk.metadata.path = doc.path.clone();
        }

        debug!(
            language = %self.language,
            path = doc.path.as_deref().unwrap_or("-"),
            chunks = chunks.len(),
            "Chunked code"
        );

        chunks
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }
}
