//! Heuristic boundary-quality score and chunk size statistics.

use serde::{Deserialize, Serialize};

use crate::types::Chunk;

/// Points a single chunk can earn.
const POINTS_PER_CHUNK: f64 = 2.0;

/// Score how well a chunk set keeps sentences, words and paragraphs whole.
///
/// Per chunk: one point for ending in `.`, `!` or `?`; half a point for not
/// starting mid-word; half a point for containing a paragraph break. The
/// result is awarded over possible points, rounded to three decimals, and
/// `0.0` for an empty set.
pub fn quality_score(chunks: &[Chunk]) -> f64 {
    score_texts(chunks.iter().map(|c| c.text.as_str()))
}

/// [`quality_score`] over raw texts.
pub fn score_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> f64 {
    let mut awarded = 0.0;
    let mut possible = 0.0;

    for text in texts {
        awarded += score_one(text);
        possible += POINTS_PER_CHUNK;
    }

    if possible == 0.0 {
        return 0.0;
    }
    round3(awarded / possible)
}

fn score_one(text: &str) -> f64 {
    let mut points = 0.0;

    if text.trim_end().ends_with(['.', '!', '?']) {
        points += 1.0;
    }

    let leading_whitespace = text.starts_with(char::is_whitespace);
    let long_first_token = text
        .split_whitespace()
        .next()
        .is_some_and(|token| token.chars().count() > 2);
    if !leading_whitespace || long_first_token {
        points += 0.5;
    }

    if text.contains("\n\n") {
        points += 0.5;
    }

    points
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Size distribution of a chunk set, in characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkStats {
    pub count: usize,
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub min: usize,
    pub max: usize,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        let sizes: Vec<usize> = chunks.iter().map(|c| c.size).collect();
        Self::from_sizes(&sizes)
    }

    pub fn from_sizes(sizes: &[usize]) -> Self {
        if sizes.is_empty() {
            return Self::default();
        }

        let count = sizes.len();
        let mean = sizes.iter().sum::<usize>() as f64 / count as f64;
        let variance = sizes
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        Self {
            count,
            mean,
            variance,
            min: sizes.iter().copied().min().unwrap_or(0),
            max: sizes.iter().copied().max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_perfect_score() {
        let texts = ["First paragraph.\n\nSecond one.", "Another.\n\nAnd done!"];
        assert_eq!(score_texts(texts), 1.0);
    }

    #[test]
    fn test_partial_score() {
        // 0.5 (starts cleanly) of 2 possible
        assert_eq!(score_texts(["no ending here"]), 0.25);
        // mid-word start: leading space and a short first token
        assert_eq!(score_texts([" ab cd."]), 0.5);
        // leading space but a long first token still counts as clean
        assert_eq!(score_texts([" abc."]), 0.75);
    }

    #[test]
    fn test_rounding() {
        let texts = ["a", "b", "c."];
        // (0.5 + 0.5 + 1.5) / 6
        assert_eq!(score_texts(texts), 0.417);
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(score_texts(Vec::<&str>::new()), 0.0);
        assert_eq!(quality_score(&[]), 0.0);
    }

    #[test]
    fn test_stats() {
        let stats = ChunkStats::from_sizes(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.variance, 4.0);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 9);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(ChunkStats::from_sizes(&[]), ChunkStats::default());
    }
}
