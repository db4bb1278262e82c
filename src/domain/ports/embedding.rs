use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding};

/// Turns text into vectors comparable with the ones stored in the index.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn model(&self) -> &str;
    fn dimension(&self) -> usize;
}
