use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Message;

/// Snapshot of a session's chat persisted after every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub messages: Vec<Message>,
}

impl TranscriptRecord {
    pub fn new(session_id: Uuid, messages: Vec<Message>) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id,
            messages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likert {
    #[serde(rename = "Strongly Disagree")]
    StronglyDisagree,
    Disagree,
    Neutral,
    Agree,
    #[serde(rename = "Strongly Agree")]
    StronglyAgree,
}

/// A user message and the assistant reply that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: Message,
    pub answer: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairReview {
    pub pair: QaPair,
    pub alias: String,
    pub rating: Likert,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub reviews: Vec<PairReview>,
}

impl FeedbackRecord {
    pub fn new(reviews: Vec<PairReview>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likert_labels() {
        assert_eq!(
            serde_json::to_string(&Likert::StronglyDisagree).unwrap(),
            r#""Strongly Disagree""#
        );
        let parsed: Likert = serde_json::from_str(r#""Agree""#).unwrap();
        assert_eq!(parsed, Likert::Agree);
    }
}
