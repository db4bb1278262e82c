use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::{errors::DomainError, Turn};

/// Incremental completion text. Finite and not restartable.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Everything the model is conditioned on for one answer.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub system: String,
    /// Prior turns, oldest first.
    pub history: Vec<Turn>,
    /// Grounding passages, most relevant first.
    pub documents: Vec<String>,
    pub question: String,
}

impl PromptContext {
    /// Renders history, grounding and the question into a single user prompt.
    pub fn render(&self) -> String {
        let mut prompt = String::new();

        if !self.history.is_empty() {
            let history = self
                .history
                .iter()
                .map(|t| format!("User: {}\nAssistant: {}", t.question, t.answer))
                .collect::<Vec<_>>()
                .join("\n");
            prompt.push_str(&format!("Previous conversation:\n{}\n\n", history));
        }

        if !self.documents.is_empty() {
            let context = self
                .documents
                .iter()
                .enumerate()
                .map(|(i, d)| format!("[{}] {}", i + 1, d))
                .collect::<Vec<_>>()
                .join("\n\n");
            prompt.push_str(&format!("Context:\n{}\n\n", context));
        }

        if prompt.is_empty() {
            return self.question.clone();
        }

        prompt.push_str(&format!("Current message from user: {}", self.question));
        prompt
    }
}

#[async_trait]
pub trait LlmService: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn generate(&self, context: &PromptContext) -> Result<TextStream, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_question_renders_as_is() {
        let ctx = PromptContext {
            question: "What is Faber?".into(),
            ..Default::default()
        };
        assert_eq!(ctx.render(), "What is Faber?");
    }

    #[test]
    fn test_render_orders_history_then_context() {
        let ctx = PromptContext {
            system: "sys".into(),
            history: vec![Turn::new("q1", "a1"), Turn::new("q2", "a2")],
            documents: vec!["doc one".into()],
            question: "q3".into(),
        };
        let rendered = ctx.render();

        let q1 = rendered.find("User: q1").unwrap();
        let q2 = rendered.find("User: q2").unwrap();
        let doc = rendered.find("[1] doc one").unwrap();
        let current = rendered.find("Current message from user: q3").unwrap();
        assert!(q1 < q2 && q2 < doc && doc < current);
        assert!(!rendered.contains("sys"));
    }
}
