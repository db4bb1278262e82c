use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DomainError, IndexedPassage,
};

/// Embeds corpus passages and writes them to the vector index. Runs offline.
pub struct CorpusIndexer {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl CorpusIndexer {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
            batch_size: 32,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Indexes every passage with non-blank content; returns how many were written.
    #[instrument(skip(self, passages), fields(count = passages.len(), model = self.embedding.model()))]
    pub async fn index(&self, passages: &[IndexedPassage]) -> Result<usize, DomainError> {
        let passages: Vec<&IndexedPassage> = passages
            .iter()
            .filter(|p| !p.content.trim().is_empty())
            .collect();

        let mut written = 0;
        for batch in passages.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|p| p.content.as_str()).collect();
            let embeddings = self.embedding.embed_batch(&texts).await?;

            for (passage, embedding) in batch.iter().zip(embeddings.iter()) {
                self.vector_store.upsert(passage, embedding).await?;
                written += 1;
            }
            tracing::debug!(written, "batch indexed");
        }

        Ok(written)
    }
}
