use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};

use crate::domain::{
    ports::VectorStore, DomainError, Embedding, IndexedPassage, RetrievedDocument,
};

/// Corpus index kept in a Qdrant collection with cosine distance.
///
/// Payload per point: `content`, `source`, `page`.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    /// Connects without touching the collection; queries fail if it is absent.
    pub fn connect(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    /// Connects and creates the collection when missing. Used when building the index.
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let store = Self::connect(url, collection, dimension)?;
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            tracing::info!(collection = %self.collection, dimension = self.dimension, "creating collection");
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(
        &self,
        passage: &IndexedPassage,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::validation(format!(
                "embedding has {} dimensions, collection expects {}",
                embedding.dimension(),
                self.dimension
            )));
        }

        let payload: Payload = serde_json::json!({
            "content": passage.content,
            "source": passage.source,
            "page": passage.page,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(
            passage.id().to_string(),
            embedding.as_slice().to_vec(),
            payload,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .score_threshold(min_score)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let documents = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;
                let content = payload.get("content")?.as_str()?.to_string();
                let source = payload.get("source")?.as_str()?.to_string();
                let page = payload.get("page")?.as_integer()?;

                Some(RetrievedDocument {
                    content,
                    source,
                    page: u32::try_from(page).ok()?,
                    relevance_score: point.score,
                })
            })
            .collect();

        Ok(documents)
    }
}
