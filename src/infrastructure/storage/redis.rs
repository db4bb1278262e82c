use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};

use crate::domain::ports::{FeedbackStore, TranscriptStore};
use crate::domain::{DomainError, FeedbackRecord, TranscriptRecord};

pub type RedisPool = Pool;

pub mod keys {
    use uuid::Uuid;

    pub const FEEDBACK_INDEX: &str = "feedback:index";

    pub fn transcripts(session_id: &Uuid) -> String {
        format!("transcripts:{}", session_id)
    }

    pub fn feedback(record_id: &Uuid) -> String {
        format!("feedback:{}", record_id)
    }
}

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
}

/// Append-only transcript log and feedback records in Redis.
#[derive(Clone)]
pub struct RedisRecordStore {
    pool: RedisPool,
}

impl RedisRecordStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
    }
}

#[async_trait]
impl TranscriptStore for RedisRecordStore {
    async fn append(&self, record: &TranscriptRecord) -> Result<(), DomainError> {
        let json =
            serde_json::to_string(record).map_err(|e| DomainError::internal(e.to_string()))?;
        let mut conn = self.conn().await?;

        conn.rpush::<_, _, ()>(keys::transcripts(&record.session_id), json)
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))?;

        tracing::debug!(session_id = %record.session_id, "transcript appended");
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for RedisRecordStore {
    async fn save(&self, record: &FeedbackRecord) -> Result<(), DomainError> {
        let json =
            serde_json::to_string(record).map_err(|e| DomainError::internal(e.to_string()))?;
        let mut conn = self.conn().await?;

        conn.set::<_, _, ()>(keys::feedback(&record.id), json)
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))?;
        conn.rpush::<_, _, ()>(keys::FEEDBACK_INDEX, record.id.to_string())
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))?;

        tracing::info!(record_id = %record.id, reviews = record.reviews.len(), "feedback saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            keys::transcripts(&id),
            "transcripts:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            keys::feedback(&id),
            "feedback:00000000-0000-0000-0000-000000000000"
        );
    }
}
