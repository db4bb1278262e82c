use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::FeedbackStore, DomainError, FeedbackRecord, Likert, MessageRole, PairReview, QaPair,
    Transcript,
};

/// Every user message answered by the message right after it, skipping the
/// opening greeting. Unanswered questions are left out.
pub fn review_pairs(transcript: &Transcript) -> Vec<QaPair> {
    transcript
        .messages
        .get(1..)
        .unwrap_or_default()
        .windows(2)
        .filter(|pair| pair[0].role == MessageRole::User && pair[1].role == MessageRole::Assistant)
        .map(|pair| QaPair {
            question: pair[0].clone(),
            answer: pair[1].clone(),
        })
        .collect()
}

/// One reviewer verdict on the pair at `pair_index`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub pair_index: usize,
    pub alias: String,
    pub rating: Likert,
    #[serde(default)]
    pub notes: String,
}

pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    #[instrument(
        skip(self, transcript, inputs),
        fields(session_id = %transcript.session_id, reviews = inputs.len())
    )]
    pub async fn submit(
        &self,
        transcript: &Transcript,
        inputs: Vec<ReviewInput>,
    ) -> Result<FeedbackRecord, DomainError> {
        let pairs = review_pairs(transcript);
        if pairs.is_empty() {
            return Err(DomainError::validation("conversation has nothing to review yet"));
        }
        if inputs.is_empty() {
            return Err(DomainError::validation("no reviews submitted"));
        }

        let reviews = inputs
            .into_iter()
            .map(|input| {
                let pair = pairs.get(input.pair_index).cloned().ok_or_else(|| {
                    DomainError::validation(format!("no Q&A pair at index {}", input.pair_index))
                })?;
                Ok(PairReview {
                    pair,
                    alias: input.alias,
                    rating: input.rating,
                    notes: input.notes,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let record = FeedbackRecord::new(reviews);
        self.store.save(&record).await?;
        Ok(record)
    }
}
