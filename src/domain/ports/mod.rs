mod embedding;
mod llm;
mod record_store;
mod similarity;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::{LlmService, PromptContext, TextStream};
pub use record_store::{FeedbackStore, TranscriptStore};
pub use similarity::SimilarityFunction;
pub use vector_store::VectorStore;
