use async_trait::async_trait;

use crate::domain::{errors::DomainError, FeedbackRecord, TranscriptRecord};

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(&self, record: &TranscriptRecord) -> Result<(), DomainError>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn save(&self, record: &FeedbackRecord) -> Result<(), DomainError>;
}
