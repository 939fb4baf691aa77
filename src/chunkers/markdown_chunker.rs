//! Markdown adapter: heading sections with an ancestor header chain.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::assembler::{preamble_fits, ChunkAssembler, ContextInjection, PREAMBLE_JOINER};
use super::base::ChunkAdapter;
use super::classifier::BlockClassifier;
use super::splitter::{char_len, Separator};
use crate::error::Result;
use crate::types::{Block, Chunk, ChunkerConfig, SourceDocument, Strategy};

const NAME: &str = "markdown";

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading pattern");
}

/// Classification rules for markdown sections and parts.
const MARKDOWN_RULES: &[(&str, &str)] = &[
    ("heading-1", r"#\s"),
    ("heading-2", r"##\s"),
    ("heading-3", r"###\s"),
    ("heading-4", r"####\s"),
    ("heading-5", r"#####\s"),
    ("heading-6", r"######\s"),
    ("code", r"[ ]{0,3}(?:```|~~~)"),
    ("list", r"[ ]{0,3}(?:[-*+]|\d+[.)])\s"),
    ("quote", r"[ ]{0,3}>"),
    ("table", r"\|"),
];

/// Hierarchy for parts that are still too large after line grouping.
static PART_SEPARATORS: &[Separator] = &[
    Separator::literal("\n\n"),
    Separator::literal("\n"),
    Separator::trailing(". "),
    Separator::trailing("! "),
    Separator::trailing("? "),
    Separator::literal(" "),
    Separator::FixedWidth,
];

/// An open code fence.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Parse a fence marker: up to three spaces, then three or more backticks
    /// or tildes.
    fn parse(line: &str) -> Option<Self> {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return None;
        }

        let rest = &line[indent..];
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Fence { marker, len })
    }

    /// Whether `line` closes this fence.
    fn closed_by(&self, line: &str) -> bool {
        match Fence::parse(line) {
            Some(other) => {
                let trimmed = line.trim();
                other.marker == self.marker
                    && other.len >= self.len
                    && trimmed.chars().all(|c| c == self.marker)
            }
            None => false,
        }
    }
}

/// A heading-delimited section of the document.
#[derive(Debug, Clone, Default)]
struct Section<'a> {
    heading: Option<String>,
    ancestors: Vec<String>,
    lines: Vec<&'a str>,
    start_line: usize,
}

impl Section<'_> {
    fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Markdown adapter.
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    config: ChunkerConfig,
    classifier: BlockClassifier,
}

impl MarkdownChunker {
    pub const DESCRIPTION: &'static str = "Splits markdown on headings, keeping code fences intact and carrying parent headings";

    /// Create a new markdown adapter.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        Ok(Self {
            config: config.validated(NAME)?,
            classifier: BlockClassifier::new(MARKDOWN_RULES)?,
        })
    }

    /// Split into heading sections, tracking fences and the header stack.
    fn split_sections<'a>(&self, content: &'a str) -> Vec<Section<'a>> {
        let mut sections = Vec::new();
        let mut stack: Vec<(usize, String)> = Vec::new();
        let mut current = Section {
            start_line: 1,
            ..Default::default()
        };
        let mut fence: Option<Fence> = None;

        for (idx, line) in content.lines().enumerate() {
            if let Some(open) = fence {
                if open.closed_by(line) {
                    fence = None;
                }
                current.lines.push(line);
                continue;
            }

            if let Some(open) = Fence::parse(line) {
                fence = Some(open);
                current.lines.push(line);
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                let level = caps[1].len();

                sections.push(std::mem::take(&mut current));
                while stack.last().is_some_and(|(l, _)| *l >= level) {
                    stack.pop();
                }

                current = Section {
                    heading: Some(line.trim_end().to_string()),
                    ancestors: stack.iter().map(|(_, h)| h.clone()).collect(),
                    lines: vec![line],
                    start_line: idx + 1,
                };
                stack.push((level, line.trim_end().to_string()));
                continue;
            }

            current.lines.push(line);
        }
        sections.push(current);

        sections.retain(|s| !s.lines.iter().all(|l| l.trim().is_empty()));
        sections
    }

    /// Group section lines into parts at blank lines outside fences.
    fn split_parts(&self, section: &Section<'_>) -> Vec<(String, usize)> {
        let mut parts = Vec::new();
        let mut part: Vec<&str> = Vec::new();
        let mut part_start = section.start_line;
        let mut fence: Option<Fence> = None;

        for (offset, &line) in section.lines.iter().enumerate() {
            let line_no = section.start_line + offset;

            match fence {
                Some(open) if open.closed_by(line) => fence = None,
                Some(_) => {}
                None => fence = Fence::parse(line),
            }

            let blank = line.trim().is_empty();
            let splittable = fence.is_none() || !self.config.preserve_code_blocks;
            if blank && splittable {
                if !part.is_empty() {
                    parts.push((part.join("\n"), part_start));
                    part.clear();
                }
                continue;
            }

            if part.is_empty() {
                part_start = line_no;
            }
            part.push(line);
        }

        if !part.is_empty() {
            parts.push((part.join("\n"), part_start));
        }
        parts
    }

    fn header_cost(&self, ancestors: &[String]) -> usize {
        if !self.config.add_parent_headers || ancestors.is_empty() {
            return 0;
        }
        let preamble = ancestors.join("\n");
        if preamble_fits(self.config.target_size, &preamble) {
            char_len(&preamble) + char_len(PREAMBLE_JOINER)
        } else {
            0
        }
    }
}

impl ChunkAdapter for MarkdownChunker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn strategy(&self) -> Strategy {
        Strategy::Markdown
    }

    fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    fn parse_into_blocks(&self, doc: &SourceDocument) -> Vec<Block> {
        let mut blocks = Vec::new();

        for section in self.split_sections(&doc.content) {
            let text = section.text();

            if char_len(&text) + self.header_cost(&section.ancestors) <= self.config.target_size {
                let kind = self.classifier.classify(&text).to_string();
                blocks.push(
                    Block::new(text, kind)
                        .at_line(section.start_line)
                        .with_hierarchy(section.ancestors.clone(), section.heading.clone())
                        .starting_group(),
                );
                continue;
            }

            for (idx, (part, start_line)) in self.split_parts(&section).into_iter().enumerate() {
                let kind = self.classifier.classify(&part).to_string();
                let block = Block::new(part, kind)
                    .at_line(start_line)
                    .with_hierarchy(section.ancestors.clone(), section.heading.clone());
                blocks.push(if idx == 0 { block.starting_group() } else { block });
            }
        }

        blocks
    }

    fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        let blocks = self.parse_into_blocks(doc);
        let context = if self.config.add_parent_headers {
            ContextInjection::Hierarchy
        } else {
            ContextInjection::None
        };

        let mut chunks = ChunkAssembler::new(Strategy::Markdown, self.config.target_size, PART_SEPARATORS)
            .with_joiner("\n\n")
            .with_context(context)
            .with_line_ranges()
            .assemble(blocks);

        for chunk in &mut chunks {
            chunk.metadata.path = doc.path.clone();
        }

        debug!(chunks = chunks.len(), target_size = self.config.target_size, "Chunked markdown");
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

    fn chunker(target: usize) -> MarkdownChunker {
        MarkdownChunker::new(ChunkerConfig::with_size(target)).unwrap()
    }

    #[test]
    fn test_heading_sections() {
        let doc = SourceDocument::markdown("# A\n\ntext1\n\n## B\n\ntext2");
        let chunks = chunker(100).chunk(&doc);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "# A\n\ntext1");
        assert_eq!(chunks[1].text, "# A\n\n## B\n\ntext2");
        assert_eq!(chunks[1].metadata.headers, vec!["# A"]);
        assert_eq!(chunks[1].metadata.section.as_deref(), Some("## B"));
        assert_eq!(chunks[1].metadata.block_kinds, vec!["heading-2"]);
    }

    #[test]
    fn test_without_parent_headers() {
        let config = ChunkerConfig::with_size(100).with_parent_headers(false);
        let chunks = MarkdownChunker::new(config)
            .unwrap()
            .chunk(&SourceDocument::markdown("# A\n\ntext1\n\n## B\n\ntext2"));

        assert_eq!(chunks[1].text, "## B\n\ntext2");
        assert_eq!(chunks[1].metadata.headers, vec!["# A"]);
    }

    #[test]
    fn test_header_stack_pops_siblings() {
        let doc = SourceDocument::markdown("# A\n## B\nb\n### C\nc\n## D\nd\n# E\ne");
        let blocks = chunker(1000).parse_into_blocks(&doc);

        let hierarchies: Vec<Vec<String>> = blocks.iter().map(|b| b.hierarchy.clone()).collect();
        assert_eq!(
            hierarchies,
            vec![
                vec![],
                vec!["# A".to_string()],
                vec!["# A".to_string(), "## B".to_string()],
                vec!["# A".to_string()],
                vec![],
            ]
        );
    }

    #[test]
    fn test_heading_inside_fence_is_not_a_heading() {
        let doc = SourceDocument::markdown("# Title\n\n```bash\n# install deps\nmake\n```\n\nafter");
        let blocks = chunker(1000).parse_into_blocks(&doc);

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.contains("# install deps"));
    }

    #[test]
    fn test_tilde_fence_needs_matching_close() {
        let doc = SourceDocument::markdown("~~~~\n```\n# still code\n~~~~\n# Real");
        let blocks = chunker(1000).parse_into_blocks(&doc);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, "code");
        assert_eq!(blocks[1].heading.as_deref(), Some("# Real"));
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let doc = SourceDocument::markdown("intro text\n\n# First\nbody");
        let blocks = chunker(1000).parse_into_blocks(&doc);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].heading, None);
        assert_eq!(blocks[0].kind, "other");
    }

    #[test]
    fn test_whitespace_sections_dropped() {
        let doc = SourceDocument::markdown("\n\n   \n# Only\ntext");
        let blocks = chunker(1000).parse_into_blocks(&doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 4);
    }

    #[test]
    fn test_oversized_section_keeps_fence_whole() {
        let content = "# Guide\n\nSome intro paragraph here.\n\n```\nline one\n\nline two\n```\n\nClosing words.";
        let chunks = chunker(40).chunk(&SourceDocument::markdown(content));

        assert!(chunks.len() > 1);
        assert!(chunks.iter().any(|c| c.text.contains("```\nline one\n\nline two\n```")));
        assert!(chunks.iter().all(|c| c.size <= 40));
        assert_eq!(chunks[0].metadata.sub_chunk, Some(0));
        assert!(chunks.iter().all(|c| c.metadata.section.as_deref() == Some("# Guide")));
    }

    #[test]
    fn test_code_block_split_when_not_preserved() {
        let content = "# Guide\n\nIntro text here.\n\n```\nline one\n\nline two\n```";
        let parts = |preserve: bool| -> Vec<String> {
            let mut config = ChunkerConfig::with_size(30);
            config.preserve_code_blocks = preserve;
            MarkdownChunker::new(config)
                .unwrap()
                .parse_into_blocks(&SourceDocument::markdown(content))
                .into_iter()
                .map(|b| b.text)
                .collect()
        };

        assert_eq!(parts(true), vec!["# Guide", "Intro text here.", "```\nline one\n\nline two\n```"]);
        assert_eq!(parts(false), vec!["# Guide", "Intro text here.", "```\nline one", "line two\n```"]);
    }

    #[test]
    fn test_fence_parsing() {
        assert_eq!(Fence::parse("```rust"), Some(Fence { marker: '`', len: 3 }));
        assert_eq!(Fence::parse("   ~~~~"), Some(Fence { marker: '~', len: 4 }));
        assert_eq!(Fence::parse("    ```"), None);
        assert_eq!(Fence::parse("``"), None);
        assert!(Fence { marker: '`', len: 3 }.closed_by("````"));
        assert!(!Fence { marker: '`', len: 4 }.closed_by("```"));
        assert!(!Fence { marker: '`', len: 3 }.closed_by("~~~"));
    }

    #[test]
    fn test_empty_document() {
        assert!(chunker(100).chunk(&SourceDocument::markdown("")).is_empty());
    }
}
