//! Test doubles shared by unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use crate::application::services::{
    ConversationalSynthesizer, DocumentRetriever, ResolutionOrchestrator, SimilarityMatcher,
};
use crate::domain::ports::{EmbeddingService, LlmService, PromptContext, TextStream, VectorStore};
use crate::domain::{DomainError, Embedding, IndexedPassage, ReferenceEntry, RetrievedDocument};
use crate::infrastructure::TrigramSimilarity;

pub fn document(source: &str, page: u32, score: f32) -> RetrievedDocument {
    RetrievedDocument::from_passage(
        IndexedPassage::new(source, page, format!("content of {source} p{page}")),
        score,
    )
}

/// Splits a finished text word by word. Whitespace stays attached to the
/// preceding word.
pub fn fragment_stream(text: String) -> TextStream {
    let fragments: Vec<Result<String, DomainError>> = text
        .split_inclusive(char::is_whitespace)
        .map(|f| Ok(f.to_string()))
        .collect();
    Box::pin(futures::stream::iter(fragments))
}

enum Script {
    Reply(String),
    Unreachable,
    BreakAfter(String),
    Delayed(Duration, String),
    Stall(String),
}

/// Language model with a canned behaviour that remembers the last prompt.
pub struct ScriptedLlm {
    script: Script,
    last: Mutex<Option<PromptContext>>,
}

impl ScriptedLlm {
    fn with(script: Script) -> Self {
        Self {
            script,
            last: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Script::Reply(text.to_string()))
    }

    pub fn unreachable() -> Self {
        Self::with(Script::Unreachable)
    }

    /// Emits `fragment`, then fails.
    pub fn breaking_after(fragment: &str) -> Self {
        Self::with(Script::BreakAfter(fragment.to_string()))
    }

    pub fn delayed(delay: Duration, text: &str) -> Self {
        Self::with(Script::Delayed(delay, text.to_string()))
    }

    /// Emits `fragment`, then never yields again.
    pub fn stalling_after(fragment: &str) -> Self {
        Self::with(Script::Stall(fragment.to_string()))
    }

    pub fn last_context(&self) -> Option<PromptContext> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, context: &PromptContext) -> Result<TextStream, DomainError> {
        *self.last.lock().unwrap() = Some(context.clone());
        match &self.script {
            Script::Reply(text) => Ok(fragment_stream(text.clone())),
            Script::Unreachable => Err(DomainError::external("connection refused")),
            Script::BreakAfter(fragment) => {
                let items: Vec<Result<String, DomainError>> = vec![
                    Ok(fragment.clone()),
                    Err(DomainError::external("malformed chunk")),
                ];
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Script::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(fragment_stream(text.clone()))
            }
            Script::Stall(fragment) => {
                let first: Vec<Result<String, DomainError>> = vec![Ok(fragment.clone())];
                Ok(Box::pin(
                    futures::stream::iter(first).chain(futures::stream::pending()),
                ))
            }
        }
    }
}

/// Returns the same unit vector for every text.
pub struct FixedEmbedding {
    vector: Vec<f32>,
}

impl Default for FixedEmbedding {
    fn default() -> Self {
        Self {
            vector: vec![1.0, 0.0, 0.0],
        }
    }
}

#[async_trait]
impl EmbeddingService for FixedEmbedding {
    async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
        Ok(Embedding::new(self.vector.clone()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts
            .iter()
            .map(|_| Embedding::new(self.vector.clone()))
            .collect())
    }

    fn model(&self) -> &str {
        "fixed"
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Index that ignores the query and returns preset documents unfiltered.
pub struct StaticVectorStore {
    documents: Option<Vec<RetrievedDocument>>,
}

impl StaticVectorStore {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents: Some(documents),
        }
    }

    pub fn failing() -> Self {
        Self { documents: None }
    }
}

#[async_trait]
impl VectorStore for StaticVectorStore {
    async fn upsert(
        &self,
        _passage: &IndexedPassage,
        _embedding: &Embedding,
    ) -> Result<(), DomainError> {
        Err(DomainError::internal("static store is read-only"))
    }

    async fn search(
        &self,
        _query: &Embedding,
        _top_k: usize,
        _min_score: f32,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        self.documents
            .clone()
            .ok_or_else(|| DomainError::external("index unreachable"))
    }
}

/// Orchestrator over a one-entry reference set ("What is Faber?" with a
/// logo image) and the given model and index.
pub fn orchestrator_with(llm: ScriptedLlm, store: StaticVectorStore) -> ResolutionOrchestrator {
    let matcher = SimilarityMatcher::new(
        vec![ReferenceEntry::new("What is Faber?", "Faber is an assistant")
            .with_media(vec!["assets/logo.png".into()])],
        Arc::new(TrigramSimilarity::new()),
    );
    let retriever = DocumentRetriever::new(Arc::new(FixedEmbedding::default()), Arc::new(store));
    let synthesizer =
        ConversationalSynthesizer::new(Arc::new(llm), "system").with_timeout(Duration::from_secs(5));

    ResolutionOrchestrator::new(Arc::new(matcher), Arc::new(retriever), Arc::new(synthesizer))
        .with_threshold(0.009)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fragments_concatenate_back_to_text() {
        let text = "Faber is an\nassistant.  Ask away".to_string();
        let fragments: Vec<String> = fragment_stream(text.clone())
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments.len(), 7);
        assert_eq!(fragments.concat(), text);
    }
}
