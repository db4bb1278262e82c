use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DomainError, RetrievedDocument, DEFAULT_RELEVANCE_FLOOR, DEFAULT_TOP_K,
};

/// Top-K passage lookup against the corpus index.
pub struct DocumentRetriever {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
    relevance_floor: f32,
}

impl DocumentRetriever {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
            top_k: DEFAULT_TOP_K,
            relevance_floor: DEFAULT_RELEVANCE_FLOOR,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_relevance_floor(mut self, floor: f32) -> Self {
        self.relevance_floor = floor;
        self
    }

    /// At most `top_k` documents scoring at least the floor, best first.
    /// Nothing clearing the floor is an empty result, not an error.
    #[instrument(skip(self), fields(top_k = self.top_k, floor = self.relevance_floor))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        let mut documents = self
            .vector_store
            .search(&embedding, self.top_k, self.relevance_floor)
            .await?;

        documents.retain(|d| d.relevance_score >= self.relevance_floor);
        documents.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        documents.truncate(self.top_k);

        tracing::debug!(
            documents = documents.len(),
            top_score = documents.first().map(|d| d.relevance_score),
            "retrieved documents"
        );
        Ok(documents)
    }
}
