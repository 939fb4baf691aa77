//! PDF-page adapter over already-extracted page text.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::assembler::ChunkAssembler;
use super::base::ChunkAdapter;
use super::splitter::Separator;
use crate::error::{ChunkerError, Result};
use crate::types::{Block, Chunk, ChunkerConfig, SourceDocument, Strategy};

const NAME: &str = "pdf";

/// Form feed, the page break text extractors emit.
const PAGE_BREAK: char = '\x0c';

lazy_static! {
    static ref INLINE_WHITESPACE: Regex = Regex::new(r"[ \t\u{a0}]+").expect("valid whitespace pattern");
    static ref PAGE_NUMBER_LINE: Regex =
        Regex::new(r"(?i)^(?:page\s+\d+(?:\s+of\s+\d+)?|\d+(?:\s*(?:of|/)\s*\d+)?|-\s*\d+\s*-)$")
            .expect("valid page number pattern");
    static ref BLANK_RUNS: Regex = Regex::new(r"\n{3,}").expect("valid blank line pattern");
}

/// Paragraphs, then sentences, then lines and words.
static PAGE_SEPARATORS: &[Separator] = &[
    Separator::literal("\n\n"),
    Separator::trailing(". "),
    Separator::trailing("! "),
    Separator::trailing("? "),
    Separator::literal("\n"),
    Separator::literal(" "),
    Separator::FixedWidth,
];

/// How pages map to chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// One or more chunks per page; pages never share a chunk
    Preserve,
    /// Consecutive pages packed together
    Merged,
}

impl PageMode {
    fn from_config(config: &ChunkerConfig) -> Result<Self> {
        if config.preserve_pages == Some(true) && config.merge_pages {
            return Err(ChunkerError::invalid_config(
                NAME,
                config.target_size,
                config.overlap,
                "preserve_pages and merge_pages are mutually exclusive",
            ));
        }

        match config.mode.as_deref().map(|m| m.trim().to_lowercase()) {
            Some(mode) => match mode.as_str() {
                "pages" | "preserve" => Ok(PageMode::Preserve),
                "merged" | "merge" => Ok(PageMode::Merged),
                _ => Err(ChunkerError::UnsupportedMode {
                    adapter: NAME,
                    mode,
                    target_size: config.target_size,
                    overlap: config.overlap,
                }),
            },
            None if config.merge_pages || config.preserve_pages == Some(false) => Ok(PageMode::Merged),
            None => Ok(PageMode::Preserve),
        }
    }
}

/// Normalize extracted page text.
///
/// Collapses runs of spaces and tabs, drops lines holding only a page number
/// and squeezes runs of blank lines down to one.
pub fn clean_page(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !PAGE_NUMBER_LINE.is_match(line))
        .collect();

    BLANK_RUNS.replace_all(&lines.join("\n"), "\n\n").trim().to_string()
}

/// PDF-page adapter.
#[derive(Debug, Clone)]
pub struct PdfChunker {
    config: ChunkerConfig,
    mode: PageMode,
}

impl PdfChunker {
    pub const DESCRIPTION: &'static str = "Chunks extracted PDF text page by page, or packs consecutive pages together";

    /// Create a new PDF adapter.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        let config = config.validated(NAME)?;
        let mode = PageMode::from_config(&config)?;
        Ok(Self { config, mode })
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    /// Page number and raw text of every page.
    fn pages<'a>(&self, doc: &'a SourceDocument) -> Vec<(usize, &'a str)> {
        if !doc.pages.is_empty() {
            return doc
                .pages
                .iter()
                .map(|page| (page.page_number, page.text.as_str()))
                .collect();
        }

        doc.content
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(idx, text)| (idx + 1, text))
            .collect()
    }
}

impl ChunkAdapter for PdfChunker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn strategy(&self) -> Strategy {
        Strategy::Pdf
    }

    fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block> {
        self.pages(doc)
            .into_iter()
            .filter_map(|(number, text)| {
                let cleaned = clean_page(text);
                if cleaned.is_empty() {
                    return None;
                }
                let block = Block::new(cleaned, "page").on_page(number);
                Some(match self.mode {
                    PageMode::Preserve => block.starting_group(),
                    PageMode::Merged => block,
                })
            })
            .collect()
    }

    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        let blocks = self.parse_into_blocks(doc);
        let mut chunks = ChunkAssembler::new(Strategy::Pdf, self.config.target_size, PAGE_SEPARATORS)
            .with_joiner("\n\n")
            .assemble(blocks);

        let extra = doc.info.as_ref().and_then(|info| serde_json::to_value(info).ok());
        for chunk in &mut chunks {
            chunk.metadata.extra = extra.clone();
            chunk.metadata.path = doc.path.clone();
            if self.mode == PageMode::Merged {
                chunk.metadata.page = None;
            }
        }

        debug!(mode = ?self.mode, chunks = chunks.len(), "Chunked PDF pages");
        chunks
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }
}
