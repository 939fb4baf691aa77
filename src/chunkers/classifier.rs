//! Rule-driven structural classification of text spans.

use regex::Regex;

use crate::error::{ChunkerError, Result};

/// Label returned when no rule matches.
pub const OTHER: &str = "other";

/// A single (label, pattern) rule.
#[derive(Debug, Clone)]
struct Rule {
    label: String,
    pattern: Regex,
}

/// Generic classifier over an ordered rule table.
///
/// Rules are tried in order against the start of a span (leading blank lines
/// skipped); the first match wins. Language and format specifics live in the
/// rule tables, not here, so list rarer constructs before the generic
/// patterns they would otherwise be shadowed by.
#[derive(Debug, Clone, Default)]
pub struct BlockClassifier {
    rules: Vec<Rule>,
}

impl BlockClassifier {
    /// Compile a rule table. Patterns are anchored at the start of the span.
    pub fn new(rules: &[(&str, &str)]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(label, pattern)| {
                Regex::new(&format!("^(?:{pattern})"))
                    .map(|pattern| Rule {
                        label: label.to_string(),
                        pattern,
                    })
                    .map_err(|source| ChunkerError::InvalidPattern {
                        label: label.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Label for the given span, or [`OTHER`].
    pub fn classify(&self, span: &str) -> &str {
        let head = span.trim_start_matches(|c: char| c == '\n' || c == '\r');
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(head))
            .map(|rule| rule.label.as_str())
            .unwrap_or(OTHER)
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[(&str, &str)] = &[
        ("async-function", r"async\s+function\s+\w+"),
        ("function", r"function\s+\w+"),
        ("class", r"class\s+\w+"),
    ];

    #[test]
    fn test_first_match_wins() {
        let classifier = BlockClassifier::new(RULES).unwrap();
        assert_eq!(classifier.classify("async function load() {}"), "async-function");
        assert_eq!(classifier.classify("function load() {}"), "function");
        assert_eq!(classifier.classify("\n\nclass Foo {}"), "class");
    }

    #[test]
    fn test_matches_only_at_start() {
        let classifier = BlockClassifier::new(RULES).unwrap();
        assert_eq!(classifier.classify("const x = 1;\nfunction late() {}"), OTHER);
    }

    #[test]
    fn test_empty_table() {
        let classifier = BlockClassifier::default();
        assert!(classifier.is_empty());
        assert_eq!(classifier.classify("anything"), OTHER);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = BlockClassifier::new(&[("broken", r"(unclosed")]).unwrap_err();
        assert!(matches!(err, ChunkerError::InvalidPattern { ref label, .. } if label == "broken"));
    }
}
