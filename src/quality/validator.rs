//! Non-fatal size and emptiness checks over emitted chunks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Chunk;
use crate::{MIN_CHUNK_CHARS, OVERSIZE_FACTOR};

/// Outcome of validating a chunk set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff `issues` is empty
    pub is_valid: bool,
    /// One human-readable line per problem found
    pub issues: Vec<String>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

/// Flags oversized, undersized and empty chunks.
///
/// Problems are reported, never raised; the caller decides whether to reject,
/// log or re-chunk.
#[derive(Debug, Clone)]
pub struct ChunkValidator {
    target_size: usize,
    min_size: usize,
}

impl ChunkValidator {
    pub fn new(target_size: usize) -> Self {
        Self {
            target_size,
            min_size: MIN_CHUNK_CHARS,
        }
    }

    /// Override the absolute size floor.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Largest size accepted before a chunk is flagged as oversized.
    pub fn max_size(&self) -> usize {
        (self.target_size as f64 * OVERSIZE_FACTOR).floor() as usize
    }

    pub fn validate(&self, chunks: &[Chunk]) -> ValidationReport {
        let max_size = self.max_size();
        let mut issues = Vec::new();

        for chunk in chunks {
            let id = chunk.sequence_id;

            if chunk.text.trim().is_empty() {
                issues.push(format!("chunk {id} is empty"));
                continue;
            }
            if chunk.size > max_size {
                issues.push(format!(
                    "chunk {id} has {} chars, above {max_size} (1.5x target_size {})",
                    chunk.size, self.target_size
                ));
            }
            if chunk.size < self.min_size {
                issues.push(format!(
                    "chunk {id} has {} chars, below the minimum of {}",
                    chunk.size, self.min_size
                ));
            }
        }

        debug!(chunks = chunks.len(), issues = issues.len(), "Validated chunks");
        ValidationReport::from_issues(issues)
    }
}

/// Validate chunks against `target_size` with the default floor.
pub fn validate_chunks(chunks: &[Chunk], target_size: usize) -> ValidationReport {
    ChunkValidator::new(target_size).validate(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkMetadata, Strategy};

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk::new(
            text.to_string(),
            id,
            Strategy::Generic,
            ChunkMetadata::new(Strategy::Generic, 100),
        )
    }

    #[test]
    fn test_valid_chunks() {
        let chunks = vec![chunk(0, &"a".repeat(60)), chunk(1, &"b".repeat(150))];
        let report = validate_chunks(&chunks, 100);
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_flags_each_problem() {
        let chunks = vec![chunk(0, &"a".repeat(151)), chunk(1, "tiny"), chunk(2, "   ")];
        let report = validate_chunks(&chunks, 100);

        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 3);
        assert!(report.issues[0].starts_with("chunk 0 has 151 chars, above 150"));
        assert!(report.issues[1].contains("below the minimum of 50"));
        assert_eq!(report.issues[2], "chunk 2 is empty");
    }

    #[test]
    fn test_custom_floor() {
        let report = ChunkValidator::new(100).with_min_size(1).validate(&[chunk(0, "tiny")]);
        assert!(report.is_valid);
    }

    #[test]
    fn test_empty_set_is_valid() {
        assert!(validate_chunks(&[], 100).is_valid);
    }
}
