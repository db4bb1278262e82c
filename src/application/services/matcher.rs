use std::sync::Arc;
use tracing::instrument;

use crate::domain::{ports::SimilarityFunction, ReferenceEntry, SimilarityResult};

/// Nearest-question lookup over the fixed reference dataset.
pub struct SimilarityMatcher {
    entries: Vec<ReferenceEntry>,
    similarity: Arc<dyn SimilarityFunction>,
}

impl SimilarityMatcher {
    pub fn new(entries: Vec<ReferenceEntry>, similarity: Arc<dyn SimilarityFunction>) -> Self {
        Self {
            entries,
            similarity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry for `question`. Ties keep the earlier entry; an empty
    /// dataset yields [`SimilarityResult::none`].
    #[instrument(skip(self), fields(entries = self.entries.len()))]
    pub fn find_match(&self, question: &str) -> SimilarityResult {
        let best = self
            .entries
            .iter()
            .map(|entry| (entry, self.bounded_score(question, &entry.question)))
            .fold(None::<(&ReferenceEntry, f32)>, |best, (entry, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((entry, score)),
            });

        match best {
            Some((entry, score)) => {
                tracing::debug!(score, matched = %entry.question, "reference match");
                SimilarityResult {
                    answer: entry.answer.clone(),
                    score,
                    media: entry.media.clone(),
                }
            }
            None => SimilarityResult::none(),
        }
    }

    fn bounded_score(&self, a: &str, b: &str) -> f32 {
        let score = self.similarity.score(a, b);
        if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        }
    }
}
