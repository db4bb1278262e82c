use std::collections::HashSet;

use crate::domain::ports::SimilarityFunction;

/// Jaccard similarity over character trigrams of normalized text.
///
/// Text is lower-cased, stripped of punctuation and padded with a space on
/// each side so word boundaries contribute trigrams of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrigramSimilarity;

impl TrigramSimilarity {
    pub fn new() -> Self {
        Self
    }

    fn normalize(text: &str) -> String {
        text.to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn trigrams(normalized: &str) -> HashSet<[char; 3]> {
        let padded: Vec<char> = format!(" {} ", normalized).chars().collect();
        padded
            .windows(3)
            .map(|w| [w[0], w[1], w[2]])
            .collect()
    }
}

impl SimilarityFunction for TrigramSimilarity {
    fn score(&self, a: &str, b: &str) -> f32 {
        let (a, b) = (Self::normalize(a), Self::normalize(b));
        if a.is_empty() || b.is_empty() {
            return if a == b && !a.is_empty() { 1.0 } else { 0.0 };
        }
        if a == b {
            return 1.0;
        }

        let (ta, tb) = (Self::trigrams(&a), Self::trigrams(&b));
        let shared = ta.intersection(&tb).count();
        let union = ta.union(&tb).count();
        if union == 0 {
            return 0.0;
        }

        (shared as f32 / union as f32).clamp(0.0, 1.0)
    }
}
