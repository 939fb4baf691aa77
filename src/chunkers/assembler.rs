//! Packing of ordered blocks into size-bounded chunks.

use tracing::debug;

use super::splitter::{char_len, segment_lines, split_text, Separator};
use crate::types::{Block, Chunk, ChunkMetadata, Strategy};

/// Placed between an injected preamble and the chunk body.
pub const PREAMBLE_JOINER: &str = "\n\n";

/// Placed between carried-over overlap text and the chunk body.
const OVERLAP_JOINER: &str = " ";

/// Context carried into every emitted chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextInjection {
    /// Chunks contain only their blocks
    None,
    /// The same preamble (e.g. imports) on every chunk
    Fixed(String),
    /// The ancestor headings of the chunk's first block
    Hierarchy,
    /// Up to N trailing characters of the previous chunk
    TrailingOverlap(usize),
}

/// Whether a fixed preamble leaves enough room for content.
///
/// A preamble costing more than half the target would starve the body, so
/// adapters skip it instead.
pub fn preamble_fits(target_size: usize, preamble: &str) -> bool {
    (char_len(preamble) + char_len(PREAMBLE_JOINER)) * 2 <= target_size
}

/// Packs blocks into chunks, splitting any block that alone is too large.
///
/// Blocks are appended to a running buffer while the buffer, the new block
/// and the injected context together stay within `target_size`. A block
/// marked [`Block::starts_group`] always opens a new chunk.
#[derive(Debug, Clone)]
pub struct ChunkAssembler<'a> {
    strategy: Strategy,
    target_size: usize,
    separators: &'a [Separator],
    joiner: &'static str,
    context: ContextInjection,
    track_lines: bool,
}

impl<'a> ChunkAssembler<'a> {
    /// Create an assembler; `separators` is used for oversized blocks.
    pub fn new(strategy: Strategy, target_size: usize, separators: &'a [Separator]) -> Self {
        Self {
            strategy,
            target_size: target_size.max(1),
            separators,
            joiner: "\n",
            context: ContextInjection::None,
            track_lines: false,
        }
    }

    /// String placed between blocks that share a chunk.
    pub fn with_joiner(mut self, joiner: &'static str) -> Self {
        self.joiner = joiner;
        self
    }

    pub fn with_context(mut self, context: ContextInjection) -> Self {
        self.context = context;
        self
    }

    /// Record source line ranges in chunk metadata.
    pub fn with_line_ranges(mut self) -> Self {
        self.track_lines = true;
        self
    }

    /// Pack blocks, in order, into chunks numbered from 0.
    pub fn assemble(&self, blocks: Vec<Block>) -> Vec<Chunk> {
        let block_count = blocks.len();
        let mut packer = Packer::new(self);

        for block in blocks {
            packer.push(block);
        }
        let chunks = packer.finish();

        debug!(
            strategy = %self.strategy,
            target_size = self.target_size,
            blocks = block_count,
            chunks = chunks.len(),
            "Assembled chunks"
        );

        chunks
    }

    /// Preamble for a chunk whose first block is `first`.
    fn preamble(&self, first: &Block, previous_tail: Option<&str>) -> Option<(String, &'static str)> {
        match &self.context {
            ContextInjection::None => None,
            ContextInjection::Fixed(preamble) => {
                let preamble = preamble.trim();
                (!preamble.is_empty() && preamble_fits(self.target_size, preamble))
                    .then(|| (preamble.to_string(), PREAMBLE_JOINER))
            }
            ContextInjection::Hierarchy => {
                let preamble = first.hierarchy.join("\n");
                (!preamble.is_empty() && preamble_fits(self.target_size, &preamble))
                    .then_some((preamble, PREAMBLE_JOINER))
            }
            ContextInjection::TrailingOverlap(_) => previous_tail
                .filter(|tail| !tail.is_empty())
                .map(|tail| (tail.to_string(), OVERLAP_JOINER)),
        }
    }

    /// Characters the preamble takes from the chunk, including its joiner.
    fn preamble_cost(&self, first: &Block, previous_tail: Option<&str>) -> usize {
        self.preamble(first, previous_tail)
            .map(|(preamble, joiner)| char_len(&preamble) + char_len(joiner))
            .unwrap_or(0)
    }

    /// Upper bound of the preamble cost for any chunk starting with `first`.
    fn max_preamble_cost(&self, first: &Block, previous_tail: Option<&str>) -> usize {
        match self.context {
            ContextInjection::TrailingOverlap(overlap) if overlap > 0 => overlap + char_len(OVERLAP_JOINER),
            _ => self.preamble_cost(first, previous_tail),
        }
    }

    fn metadata_for(&self, blocks: &[Block]) -> ChunkMetadata {
        let mut metadata = ChunkMetadata::new(self.strategy, self.target_size);

        for block in blocks {
            if !metadata.block_kinds.contains(&block.kind) {
                metadata.block_kinds.push(block.kind.clone());
            }
        }

        if let (Some(first), Some(last)) = (blocks.first(), blocks.last()) {
            metadata.headers = first.hierarchy.clone();
            metadata.section = first.heading.clone();
            if self.track_lines {
                metadata.line_range = Some((first.start_line, last.end_line()));
            }
        }

        let pages: Vec<usize> = blocks.iter().filter_map(|b| b.page).collect();
        if let (Some(&low), Some(&high)) = (pages.iter().min(), pages.iter().max()) {
            metadata.page_range = Some((low, high));
            if low == high {
                metadata.page = Some(low);
            }
        }

        metadata
    }
}

/// Mutable state of one `assemble` call.
struct Packer<'s, 'a> {
    assembler: &'s ChunkAssembler<'a>,
    buffer: Vec<Block>,
    buffer_size: usize,
    chunks: Vec<Chunk>,
    /// Index of the first chunk of an explicitly started group
    group_start: Option<usize>,
    previous_tail: Option<String>,
}

impl<'s, 'a> Packer<'s, 'a> {
    fn new(assembler: &'s ChunkAssembler<'a>) -> Self {
        Self {
            assembler,
            buffer: Vec::new(),
            buffer_size: 0,
            chunks: Vec::new(),
            group_start: None,
            previous_tail: None,
        }
    }

    fn push(&mut self, block: Block) {
        if block.starts_group {
            self.flush();
            self.close_group();
            self.group_start = Some(self.chunks.len());
        }

        let target = self.assembler.target_size;
        // The block may end up opening the next chunk, so budget for either preamble
        let tail = self.previous_tail.as_deref();
        let cost = match self.buffer.first() {
            Some(first) => self
                .assembler
                .max_preamble_cost(first, tail)
                .max(self.assembler.max_preamble_cost(&block, tail)),
            None => self.assembler.max_preamble_cost(&block, tail),
        };
        let budget = target.saturating_sub(cost).max(1);

        if block.size() <= budget {
            self.append(block);
            return;
        }

        // Oversized: split it and pack the pieces like ordinary blocks
        self.flush();
        let cost = self.assembler.max_preamble_cost(&block, self.previous_tail.as_deref());
        let budget = target.saturating_sub(cost).max(1);
        let segments = split_text(&block.text, self.assembler.separators, budget);
        let lines = segment_lines(&block.text, &segments, block.start_line);

        debug!(size = block.size(), budget, pieces = segments.len(), "Split oversized block");

        for (segment, line) in segments.into_iter().zip(lines) {
            let piece = block.piece(segment, line);
            self.append(piece);
        }
    }

    fn append(&mut self, block: Block) {
        let size = block.size();

        if self.buffer.is_empty() {
            self.buffer.push(block);
            self.buffer_size = size;
            return;
        }

        let joiner = char_len(self.assembler.joiner);
        let cost = self
            .assembler
            .preamble_cost(&self.buffer[0], self.previous_tail.as_deref());

        if cost + self.buffer_size + joiner + size <= self.assembler.target_size {
            self.buffer.push(block);
            self.buffer_size += joiner + size;
        } else {
            self.flush();
            self.buffer.push(block);
            self.buffer_size = size;
        }
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let blocks = std::mem::take(&mut self.buffer);
        self.buffer_size = 0;

        let body = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(self.assembler.joiner);
        let body = body.trim();
        if body.is_empty() {
            return;
        }

        let text = match self.assembler.preamble(&blocks[0], self.previous_tail.as_deref()) {
            Some((preamble, joiner)) => format!("{preamble}{joiner}{body}"),
            None => body.to_string(),
        };

        if let ContextInjection::TrailingOverlap(overlap) = self.assembler.context {
            self.previous_tail = Some(overlap_tail(body, overlap));
        }

        let metadata = self.assembler.metadata_for(&blocks);
        let sequence_id = self.chunks.len();
        self.chunks.push(Chunk::new(
            text.trim().to_string(),
            sequence_id,
            self.assembler.strategy,
            metadata,
        ));
    }

    /// Number the chunks of the current group when it produced more than one.
    fn close_group(&mut self) {
        if let Some(start) = self.group_start.take() {
            if self.chunks.len() - start > 1 {
                for (index, chunk) in self.chunks[start..].iter_mut().enumerate() {
                    chunk.metadata.sub_chunk = Some(index);
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.close_group();
        self.chunks
    }
}

/// Up to `overlap` trailing characters of `body`, starting on a word
/// boundary when one is available.
fn overlap_tail(body: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let total = char_len(body);
    let skip = total.saturating_sub(overlap);
    let tail: String = body.chars().skip(skip).collect();

    let on_boundary = body.chars().nth(skip.saturating_sub(1)).map_or(true, char::is_whitespace);
    if skip == 0 || on_boundary {
        return tail.trim_start().to_string();
    }

    match tail.find(char::is_whitespace) {
        Some(pos) if !tail[pos..].trim().is_empty() => tail[pos..].trim_start().to_string(),
        _ => tail,
    }
}
