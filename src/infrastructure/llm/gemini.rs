use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::gemini;
use rig::streaming::StreamingPrompt;

use super::text_chunks;
use crate::domain::ports::{LlmService, PromptContext, TextStream};
use crate::domain::DomainError;

/// Gemini models through rig. Reads `GEMINI_API_KEY`.
pub struct GeminiLlm {
    client: gemini::Client,
    model: String,
    max_tokens: u64,
}

impl GeminiLlm {
    pub fn new(model: impl Into<String>, max_tokens: u64) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl LlmService for GeminiLlm {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, context: &PromptContext) -> Result<TextStream, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&context.system)
            .max_tokens(self.max_tokens)
            .build();

        let stream = agent.stream_prompt(context.render()).await;
        Ok(text_chunks(stream, "gemini"))
    }
}
