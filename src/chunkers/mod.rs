//! Chunking strategies for different content types.
//!
//! Every adapter turns a document into structural blocks and shares the
//! same splitter and assembler for size-bounded packing.

mod assembler;
mod base;
mod classifier;
mod code_chunker;
mod generic_chunker;
mod markdown_chunker;
mod pdf_chunker;
mod splitter;

pub use assembler::{preamble_fits, ChunkAssembler, ContextInjection, PREAMBLE_JOINER};
pub use base::ChunkAdapter;
pub use classifier::{BlockClassifier, OTHER};
pub use code_chunker::CodeChunker;
pub use generic_chunker::GenericChunker;
pub use markdown_chunker::MarkdownChunker;
pub use pdf_chunker::{clean_page, PageMode, PdfChunker};
pub use splitter::{char_len, segment_lines, split_fixed_width, split_text, terminated, RecursiveSplitter, Separator};
