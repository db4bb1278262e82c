mod anthropic;
mod gemini;

use std::sync::Arc;

use futures::StreamExt;
use rig::agent::{MultiTurnStreamItem, StreamingResult};
use rig::streaming::StreamedAssistantContent;

use crate::domain::ports::{LlmService, TextStream};
use crate::domain::DomainError;
use crate::infrastructure::config::LlmConfig;

pub use anthropic::AnthropicLlm;
pub use gemini::GeminiLlm;

pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmService>, DomainError> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicLlm::new(&config.model, config.max_tokens))),
        "gemini" => Ok(Arc::new(GeminiLlm::new(&config.model, config.max_tokens))),
        other => Err(DomainError::validation(format!("unknown llm provider: {other}"))),
    }
}

/// Keeps the text deltas of a rig stream. Tool calls, reasoning and the
/// provider's final usage record are dropped.
fn text_chunks<R>(stream: StreamingResult<R>, provider: &'static str) -> TextStream
where
    R: Send + 'static,
{
    Box::pin(stream.filter_map(move |item| async move {
        match item {
            Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(t))) => {
                (!t.text.is_empty()).then_some(Ok(t.text))
            }
            Ok(_) => None,
            Err(e) => Some(Err(DomainError::external(format!(
                "{provider} stream failed: {e}"
            )))),
        }
    }))
}
