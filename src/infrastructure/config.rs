use std::path::Path;

use serde::Deserialize;

use crate::domain::{
    CannedReplies, DomainError, DEFAULT_CONVERSATION_WINDOW, DEFAULT_MATCH_THRESHOLD,
    DEFAULT_RELEVANCE_FLOOR, DEFAULT_TOP_K,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Reads `config.yaml` and `prompts.yaml` from `dir`, falling back to
    /// defaults for missing files, then applies environment overrides.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = dir.as_ref();
        let config: Config = read_yaml(&dir.join("config.yaml"))?.unwrap_or_default();
        let prompts: PromptsConfig = read_yaml(&dir.join("prompts.yaml"))?.unwrap_or_default();

        let mut app = Self { config, prompts };
        app.apply_env();
        Ok(app)
    }

    fn apply_env(&mut self) {
        let c = &mut self.config;
        if let Ok(v) = std::env::var("REDIS_URL") {
            c.storage.redis_url = Some(v);
        }
        if let Ok(v) = std::env::var("QDRANT_URL") {
            c.retrieval.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("SERVER_HOST") {
            c.server.host = v;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()) {
            c.server.port = port;
        }
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            c.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            c.llm.model = v;
        }
        if let Ok(v) = std::env::var("REFERENCE_DATASET") {
            c.matcher.dataset_path = v;
        }
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file missing, using defaults");
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::internal(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub matcher: MatcherConfig,
    pub conversation: ConversationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Accepted `X-API-Key` values. Empty disables the check.
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub max_tokens: u64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub relevance_floor: f32,
    pub qdrant_url: String,
    pub collection: String,
    /// When set, the API indexes this passages file into process memory at
    /// startup and never contacts Qdrant.
    pub corpus_path: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            relevance_floor: DEFAULT_RELEVANCE_FLOOR,
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "faber_corpus".to_string(),
            corpus_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub threshold: f32,
    pub dataset_path: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            dataset_path: "data/reference_qa.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub window: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_seconds: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_CONVERSATION_WINDOW,
            session_idle_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Without a Redis URL, transcripts and feedback stay in memory.
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system: String,
    pub greeting: String,
    pub cleared_greeting: String,
    pub retrieval_failure: String,
    pub generation_failure: String,
}

impl PromptsConfig {
    pub fn replies(&self) -> CannedReplies {
        CannedReplies {
            greeting: self.greeting.clone(),
            cleared_greeting: self.cleared_greeting.clone(),
            retrieval_failure: self.retrieval_failure.clone(),
            generation_failure: self.generation_failure.clone(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: "You are Faber, a helpful assistant. Answer the user's question using the \
                     provided context when it is relevant. If the context does not contain the \
                     answer, say so plainly instead of guessing."
                .to_string(),
            greeting: "Hi there, I'm Faber 🤖 Ask me a question!".to_string(),
            cleared_greeting: "Hey, how may I help you?".to_string(),
            retrieval_failure: "Sorry, I couldn't fetch resources for that question.".to_string(),
            generation_failure: "Something went wrong while generating an answer. Please try \
                                 again."
                .to_string(),
        }
    }
}
