//! Post-chunking checks: size validation and boundary quality.

mod scorer;
mod validator;

pub use scorer::{quality_score, score_texts, ChunkStats};
pub use validator::{validate_chunks, ChunkValidator, ValidationReport};
