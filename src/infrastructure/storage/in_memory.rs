use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::ports::{FeedbackStore, TranscriptStore};
use crate::domain::{DomainError, FeedbackRecord, TranscriptRecord};

/// Process-local record store for development and tests.
#[derive(Default)]
pub struct InMemoryRecordStore {
    transcripts: RwLock<Vec<TranscriptRecord>>,
    feedback: RwLock<Vec<FeedbackRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcripts(&self) -> Vec<TranscriptRecord> {
        self.transcripts.read().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.read().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryRecordStore {
    async fn append(&self, record: &TranscriptRecord) -> Result<(), DomainError> {
        self.transcripts
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for InMemoryRecordStore {
    async fn save(&self, record: &FeedbackRecord) -> Result<(), DomainError> {
        self.feedback
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}
