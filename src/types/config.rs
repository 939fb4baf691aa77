//! Configuration types for chunking.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChunkerError, Result};
use crate::{DEFAULT_OVERLAP, DEFAULT_TARGET_SIZE};

/// Process-wide service configuration.
///
/// Loaded from `CHUNKER_*` environment variables layered over the defaults,
/// e.g. `CHUNKER_PORT=8080` or `CHUNKER_DEFAULT_TARGET_SIZE=1500`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Default chunk size in characters
    pub default_target_size: usize,

    /// Default overlap in characters
    pub default_overlap: usize,

    /// HTTP port to bind
    pub port: u16,

    /// Maximum benchmark cells running at once
    pub max_concurrent_benchmarks: usize,

    /// Emit logs as JSON instead of the human-readable format
    pub log_json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_target_size: DEFAULT_TARGET_SIZE,
            default_overlap: DEFAULT_OVERLAP,
            port: 3017,
            max_concurrent_benchmarks: 4,
            log_json: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("CHUNKER").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Per-call chunker configuration seeded from the service defaults.
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::with_size(self.default_target_size).with_overlap(self.default_overlap)
    }
}

/// Configuration for a single chunking call.
///
/// Sizes are measured in characters. Format-specific flags are ignored by
/// adapters they do not apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk
    pub target_size: usize,

    /// Characters carried over between chunks (generic adapter only)
    pub overlap: usize,

    /// Split code on class/function boundaries before falling back to lines
    pub preserve_functions: bool,

    /// Prefix every code chunk with the file's import preamble
    pub include_imports: bool,

    /// Never split markdown on blank lines inside fenced code blocks
    pub preserve_code_blocks: bool,

    /// Prefix markdown chunks with their ancestor headings
    pub add_parent_headers: bool,

    /// One or more chunks per PDF page; pages are preserved unless
    /// `merge_pages` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_pages: Option<bool>,

    /// Pack consecutive PDF pages together
    pub merge_pages: bool,

    /// Language selector for the code adapter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Mode selector for the PDF adapter ("pages" or "merged")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Custom separator hierarchy for the generic adapter ("" = fixed width)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separators: Option<Vec<String>>,

    /// Clamp invalid sizes instead of rejecting them
    pub lenient: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            overlap: DEFAULT_OVERLAP,
            preserve_functions: true,
            include_imports: true,
            preserve_code_blocks: true,
            add_parent_headers: true,
            preserve_pages: None,
            merge_pages: false,
            language: None,
            mode: None,
            separators: None,
            lenient: false,
        }
    }
}

impl ChunkerConfig {
    /// Create a config with the given target size and no overlap.
    pub fn with_size(size: usize) -> Self {
        Self {
            target_size: size,
            overlap: 0,
            ..Default::default()
        }
    }

    /// Set the overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Set the PDF mode selector.
    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = Some(mode.to_string());
        self
    }

    /// Set a custom separator hierarchy.
    pub fn with_separators<S: Into<String>>(mut self, separators: impl IntoIterator<Item = S>) -> Self {
        self.separators = Some(separators.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_imports(mut self, include: bool) -> Self {
        self.include_imports = include;
        self
    }

    pub fn with_parent_headers(mut self, add: bool) -> Self {
        self.add_parent_headers = add;
        self
    }

    pub fn with_merged_pages(mut self, merge: bool) -> Self {
        self.merge_pages = merge;
        self.preserve_pages = Some(!merge);
        self
    }

    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Check the size invariants, returning the config an adapter should use.
    ///
    /// In lenient mode out-of-range values are clamped and logged; otherwise
    /// they are rejected.
    pub fn validated(mut self, adapter: &'static str) -> Result<Self> {
        if self.target_size == 0 {
            if !self.lenient {
                return Err(ChunkerError::invalid_config(
                    adapter,
                    self.target_size,
                    self.overlap,
                    "target_size must be positive",
                ));
            }
            warn!(adapter, "target_size of 0 clamped to 1");
            self.target_size = 1;
        }

        if self.overlap >= self.target_size {
            if !self.lenient {
                return Err(ChunkerError::invalid_config(
                    adapter,
                    self.target_size,
                    self.overlap,
                    "overlap must be smaller than target_size",
                ));
            }
            let clamped = self.target_size - 1;
            warn!(adapter, overlap = self.overlap, clamped, "overlap clamped below target_size");
            self.overlap = clamped;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_target() {
        let err = ChunkerConfig::with_size(0).validated("generic").unwrap_err();
        assert!(err.to_string().contains("target_size must be positive"));
        assert!(err.to_string().contains("generic"));
    }

    #[test]
    fn test_rejects_overlap_at_target() {
        let result = ChunkerConfig::with_size(100).with_overlap(100).validated("generic");
        assert!(matches!(result, Err(ChunkerError::InvalidConfig { overlap: 100, .. })));
    }

    #[test]
    fn test_lenient_clamps() {
        let config = ChunkerConfig::with_size(0).with_overlap(5).lenient().validated("generic").unwrap();
        assert_eq!(config.target_size, 1);
        assert_eq!(config.overlap, 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"target_size": 300}"#).unwrap();
        assert_eq!(config.target_size, 300);
        assert_eq!(config.overlap, DEFAULT_OVERLAP);
        assert!(config.include_imports);
    }
}
