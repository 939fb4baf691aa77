//! Error types for the chunking engine.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors raised while configuring or constructing a chunker.
///
/// Chunking itself never fails once an adapter has been built; every variant
/// here is a construction-time or input-validation problem.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Size/overlap/flag combination rejected at construction.
    #[error("invalid configuration for {adapter} (target_size={target_size}, overlap={overlap}): {reason}")]
    InvalidConfig {
        adapter: &'static str,
        reason: String,
        target_size: usize,
        overlap: usize,
    },

    /// No rule table exists for the requested language.
    #[error("{adapter} chunker does not support language '{language}' (target_size={target_size}, overlap={overlap})")]
    UnsupportedLanguage {
        adapter: &'static str,
        language: String,
        target_size: usize,
        overlap: usize,
    },

    /// Unknown mode selector (e.g. PDF page mode).
    #[error("{adapter} chunker does not support mode '{mode}' (target_size={target_size}, overlap={overlap})")]
    UnsupportedMode {
        adapter: &'static str,
        mode: String,
        target_size: usize,
        overlap: usize,
    },

    /// Strategy name that maps to no adapter.
    #[error("{adapter} has no chunking strategy '{name}' (expected one of: code, markdown, pdf, generic)")]
    UnknownStrategy { adapter: &'static str, name: String },

    /// A classification rule failed to compile.
    #[error("invalid pattern for rule '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    /// Service settings could not be loaded.
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl ChunkerError {
    pub(crate) fn invalid_config(
        adapter: &'static str,
        target_size: usize,
        overlap: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            adapter,
            reason: reason.into(),
            target_size,
            overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_config_snapshot() {
        let err = ChunkerError::UnsupportedLanguage {
            adapter: "code",
            language: "cobol".to_string(),
            target_size: 500,
            overlap: 100,
        };
        assert_eq!(
            err.to_string(),
            "code chunker does not support language 'cobol' (target_size=500, overlap=100)"
        );

        let err = ChunkerError::UnsupportedMode {
            adapter: "pdf",
            mode: "columns".to_string(),
            target_size: 300,
            overlap: 0,
        };
        assert!(err.to_string().ends_with("(target_size=300, overlap=0)"));

        let err = ChunkerError::UnknownStrategy {
            adapter: "router",
            name: "semantic".to_string(),
        };
        assert!(err.to_string().starts_with("router has no chunking strategy 'semantic'"));
    }
}
