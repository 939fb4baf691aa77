//! Structured Chunker Library
//!
//! Structure-aware text chunking for retrieval pipelines. Documents are
//! parsed into structural blocks (functions, sections, pages, paragraphs)
//! and packed into size-bounded chunks that keep those boundaries intact.

pub mod api;
pub mod benchmark;
pub mod chunkers;
pub mod error;
pub mod processing;
pub mod quality;
pub mod router;
pub mod types;

pub use benchmark::{BenchmarkCase, BenchmarkHarness, BenchmarkReport, BenchmarkResult};
pub use chunkers::{ChunkAdapter, CodeChunker, GenericChunker, MarkdownChunker, PdfChunker};
pub use error::{ChunkerError, Result};
pub use router::{Adapter, ChunkingOutcome, ChunkingRouter};
pub use types::{Chunk, ChunkMetadata, ChunkerConfig, SourceDocument, SourceKind, Strategy};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::benchmark::*;
    pub use crate::chunkers::{ChunkAdapter, CodeChunker, GenericChunker, MarkdownChunker, PdfChunker};
    pub use crate::error::{ChunkerError, Result};
    pub use crate::quality::*;
    pub use crate::router::{Adapter, ChunkingOutcome, ChunkingRouter};
    pub use crate::types::*;
}

/// Default chunk size in characters
pub const DEFAULT_TARGET_SIZE: usize = 1000;

/// Default chunk overlap in characters
pub const DEFAULT_OVERLAP: usize = 200;

/// Chunks shorter than this are reported by validation
pub const MIN_CHUNK_CHARS: usize = 50;

/// Chunks longer than `target_size` times this factor fail validation
pub const OVERSIZE_FACTOR: f64 = 1.5;
