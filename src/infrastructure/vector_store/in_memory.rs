use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorStore, DomainError, Embedding, IndexedPassage, RetrievedDocument,
};

pub struct InMemoryVectorStore {
    passages: RwLock<Vec<(IndexedPassage, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            passages: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.passages.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        passage: &IndexedPassage,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .passages
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let id = passage.id();
        store.retain(|(p, _)| p.id() != id);
        store.push((passage.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        let store = self
            .passages
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<RetrievedDocument> = store
            .iter()
            .map(|(passage, embedding)| {
                RetrievedDocument::from_passage(passage.clone(), query.relevance(embedding))
            })
            .filter(|doc| doc.relevance_score >= min_score)
            .collect();

        results.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_search() {
        let store = InMemoryVectorStore::new();
        let passage = IndexedPassage::new("docs/guide.pdf", 2, "test content");
        store
            .upsert(&passage, &Embedding::new(vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0, 0.0]), 1, 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].page, 2);
        assert!((results[0].relevance_score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = InMemoryVectorStore::new();
        let mut passage = IndexedPassage::new("a.pdf", 1, "old");
        store.upsert(&passage, &Embedding::new(vec![1.0])).await.unwrap();
        passage.content = "new".into();
        store.upsert(&passage, &Embedding::new(vec![1.0])).await.unwrap();

        assert_eq!(store.len(), 1);
        let results = store.search(&Embedding::new(vec![1.0]), 3, 0.0).await.unwrap();
        assert_eq!(results[0].content, "new");
    }

    #[tokio::test]
    async fn test_search_applies_floor_and_limit() {
        let store = InMemoryVectorStore::new();
        let vectors = [[1.0, 0.0], [0.9, 0.1], [0.7, 0.7], [0.0, 1.0]];
        for (i, v) in vectors.iter().enumerate() {
            store
                .upsert(
                    &IndexedPassage::new("a.pdf", i as u32, format!("p{i}")),
                    &Embedding::new(v.to_vec()),
                )
                .await
                .unwrap();
        }

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 2, 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "p0");
        assert_eq!(results[1].content, "p1");
        assert!(results.iter().all(|d| d.relevance_score >= 0.5));
    }
}
