//! Core types for the chunking engine.

mod block;
mod chunk;
mod config;
mod source;

pub use block::Block;
pub use chunk::{Chunk, ChunkMetadata};
pub use config::{ChunkerConfig, ServiceConfig};
pub use source::{PdfInfo, PdfPage, SourceDocument, SourceKind, Strategy};
