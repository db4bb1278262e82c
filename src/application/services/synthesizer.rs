use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::time::{Instant, Sleep};
use tracing::instrument;

use crate::domain::{
    ports::{LlmService, PromptContext, TextStream},
    Citation, ConversationState, DomainError, RetrievedDocument,
};

/// Generates grounded answers and records completed turns.
pub struct ConversationalSynthesizer {
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    timeout: Duration,
}

impl ConversationalSynthesizer {
    pub fn new(llm: Arc<dyn LlmService>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Starts a completion conditioned on the conversation window and the
    /// retrieved documents.
    ///
    /// The returned stream holds the session's state until it finishes.
    /// Only a fully consumed, non-empty completion is recorded as a turn;
    /// errors, timeouts and early drops leave the state as it was.
    #[instrument(
        skip(self, state, documents),
        fields(provider = self.llm.provider_name(), history = state.len(), documents = documents.len())
    )]
    pub async fn synthesize<'a>(
        &self,
        question: &str,
        state: &'a mut ConversationState,
        documents: &[RetrievedDocument],
    ) -> Result<AnswerStream<'a>, DomainError> {
        let context = PromptContext {
            system: self.system_prompt.clone(),
            history: state.snapshot(),
            documents: documents.iter().map(|d| d.content.clone()).collect(),
            question: question.to_string(),
        };

        let deadline = Instant::now() + self.timeout;
        let inner = tokio::time::timeout_at(deadline, self.llm.generate(&context))
            .await
            .map_err(|_| DomainError::timeout("language model did not respond in time"))??;

        Ok(AnswerStream {
            inner,
            deadline: Box::pin(tokio::time::sleep_until(deadline)),
            state: Some(state),
            question: context.question,
            answer: String::new(),
            citations: documents.iter().map(RetrievedDocument::citation).collect(),
            finished: false,
        })
    }
}

/// Answer fragments from the language model.
pub struct AnswerStream<'a> {
    inner: TextStream,
    deadline: Pin<Box<Sleep>>,
    state: Option<&'a mut ConversationState>,
    question: String,
    answer: String,
    citations: Vec<Citation>,
    finished: bool,
}

impl AnswerStream<'_> {
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Text received so far; the full answer once the stream has ended.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    fn fail(&mut self, err: DomainError) -> Poll<Option<Result<String, DomainError>>> {
        self.finished = true;
        self.state = None;
        tracing::warn!(error = %err, "generation failed");
        Poll::Ready(Some(Err(err)))
    }
}

impl Stream for AnswerStream<'_> {
    type Item = Result<String, DomainError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        if this.deadline.as_mut().poll(cx).is_ready() {
            return this.fail(DomainError::timeout("language model stream exceeded deadline"));
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => {
                this.answer.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Poll::Ready(Some(Err(err))) => this.fail(err),
            Poll::Ready(None) => {
                if this.answer.trim().is_empty() {
                    return this.fail(DomainError::external("language model returned no text"));
                }
                this.finished = true;
                if let Some(state) = this.state.take() {
                    state.record(this.question.clone(), this.answer.clone());
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{document, ScriptedLlm};
    use futures::StreamExt;

    async fn drain(stream: &mut AnswerStream<'_>) -> Vec<Result<String, DomainError>> {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_completed_stream_records_turn() {
        let llm = Arc::new(ScriptedLlm::replying("Faber is an assistant."));
        let synth = ConversationalSynthesizer::new(llm.clone(), "system");
        let mut state = ConversationState::new(3);
        let docs = vec![document("./res/guide.pdf", 3, 0.9)];

        let mut stream = synth.synthesize("What is Faber?", &mut state, &docs).await.unwrap();
        assert_eq!(stream.citations()[0].source, "guide.pdf");
        let items = drain(&mut stream).await;
        assert!(items.iter().all(Result::is_ok));
        assert_eq!(stream.answer(), "Faber is an assistant.");
        drop(stream);

        assert_eq!(state.len(), 1);
        let turn = state.turns().next().unwrap();
        assert_eq!(turn.question, "What is Faber?");
        assert_eq!(turn.answer, "Faber is an assistant.");

        let ctx = llm.last_context().unwrap();
        assert_eq!(ctx.system, "system");
        assert_eq!(ctx.documents.len(), 1);
        assert!(ctx.history.is_empty());
    }

    #[tokio::test]
    async fn test_history_is_passed_oldest_first() {
        let llm = Arc::new(ScriptedLlm::replying("ok"));
        let synth = ConversationalSynthesizer::new(llm.clone(), "system");
        let mut state = ConversationState::new(3);
        for i in 0..4 {
            state.record(format!("q{i}"), format!("a{i}"));
        }

        let mut stream = synth.synthesize("next", &mut state, &[]).await.unwrap();
        drain(&mut stream).await;

        let ctx = llm.last_context().unwrap();
        let questions: Vec<_> = ctx.history.iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn test_backend_error_leaves_state_untouched() {
        let synth = ConversationalSynthesizer::new(Arc::new(ScriptedLlm::unreachable()), "s");
        let mut state = ConversationState::new(3);
        state.record("q", "a");

        let result = synth.synthesize("question", &mut state, &[]).await;
        assert!(matches!(result, Err(DomainError::ExternalService(_))));
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let synth = ConversationalSynthesizer::new(Arc::new(ScriptedLlm::replying("  ")), "s");
        let mut state = ConversationState::new(3);

        let mut stream = synth.synthesize("question", &mut state, &[]).await.unwrap();
        let items = drain(&mut stream).await;
        assert!(matches!(items.last(), Some(Err(DomainError::ExternalService(_)))));
        drop(stream);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_records_nothing() {
        let synth =
            ConversationalSynthesizer::new(Arc::new(ScriptedLlm::breaking_after("partial ")), "s");
        let mut state = ConversationState::new(3);

        let mut stream = synth.synthesize("question", &mut state, &[]).await.unwrap();
        let items = drain(&mut stream).await;
        assert!(items[0].is_ok());
        assert!(items.last().unwrap().is_err());
        drop(stream);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let synth = ConversationalSynthesizer::new(
            Arc::new(ScriptedLlm::delayed(Duration::from_secs(30), "late")),
            "s",
        )
        .with_timeout(Duration::from_millis(50));
        let mut state = ConversationState::new(3);

        let result = synth.synthesize("question", &mut state, &[]).await;
        assert!(matches!(result, Err(DomainError::Timeout(_))));
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_stream_stalling_past_deadline_times_out() {
        let synth =
            ConversationalSynthesizer::new(Arc::new(ScriptedLlm::stalling_after("partial ")), "s")
                .with_timeout(Duration::from_millis(50));
        let mut state = ConversationState::new(3);
        state.record("q", "a");

        let mut stream = synth.synthesize("question", &mut state, &[]).await.unwrap();
        let items = drain(&mut stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "partial ");
        assert!(matches!(items[1], Err(DomainError::Timeout(_))));
        assert_eq!(stream.answer(), "partial ");
        drop(stream);

        assert_eq!(state.len(), 1);
        assert_eq!(state.turns().next().unwrap().question, "q");
    }

    #[tokio::test]
    async fn test_dropped_stream_records_nothing() {
        let synth =
            ConversationalSynthesizer::new(Arc::new(ScriptedLlm::replying("one two three")), "s");
        let mut state = ConversationState::new(3);

        let mut stream = synth.synthesize("question", &mut state, &[]).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "one ");
        drop(stream);
        assert!(state.is_empty());
    }
}
