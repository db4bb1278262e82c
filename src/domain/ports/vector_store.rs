use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding, IndexedPassage, RetrievedDocument};

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(
        &self,
        passage: &IndexedPassage,
        embedding: &Embedding,
    ) -> Result<(), DomainError>;

    /// Nearest passages by descending relevance, at most `top_k`, none below `min_score`.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievedDocument>, DomainError>;
}
