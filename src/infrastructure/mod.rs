pub mod config;
pub mod corpus;
pub mod embedding;
pub mod llm;
pub mod reference;
pub mod similarity;
pub mod storage;
pub mod vector_store;

pub use config::{AppConfig, Config, PromptsConfig};
pub use corpus::read_passages;
pub use embedding::TextEmbedding;
pub use llm::{build_llm, AnthropicLlm, GeminiLlm};
pub use reference::load_reference_set;
pub use similarity::TrigramSimilarity;
pub use storage::{InMemoryRecordStore, RedisRecordStore};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
