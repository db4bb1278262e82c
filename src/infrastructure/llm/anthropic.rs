use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::anthropic;
use rig::streaming::StreamingPrompt;

use super::text_chunks;
use crate::domain::ports::{LlmService, PromptContext, TextStream};
use crate::domain::DomainError;

/// Claude models through rig. Reads `ANTHROPIC_API_KEY`.
pub struct AnthropicLlm {
    client: anthropic::Client,
    model: String,
    max_tokens: u64,
}

impl AnthropicLlm {
    pub fn new(model: impl Into<String>, max_tokens: u64) -> Self {
        Self {
            client: anthropic::Client::from_env(),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, context: &PromptContext) -> Result<TextStream, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&context.system)
            .max_tokens(self.max_tokens)
            .build();

        let stream = agent.stream_prompt(context.render()).await;
        Ok(text_chunks(stream, "anthropic"))
    }
}
