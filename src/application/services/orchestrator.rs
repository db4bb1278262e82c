use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::instrument;

use crate::application::services::{
    AnswerStream, ConversationalSynthesizer, DocumentRetriever, SimilarityMatcher,
};
use crate::domain::{
    score_label, trailer, Citation, ComposedResponse, ConversationState, ResolveError,
    DEFAULT_MATCH_THRESHOLD,
};

/// Outcome of routing a question.
pub enum Resolution<'a> {
    /// Served from the reference dataset; nothing was generated.
    CacheHit(ComposedResponse),
    /// Generated answer, streamed.
    Generated(ResponseStream<'a>),
}

/// Routes each question to the reference dataset first and falls back to
/// retrieval-augmented generation.
pub struct ResolutionOrchestrator {
    matcher: Arc<SimilarityMatcher>,
    retriever: Arc<DocumentRetriever>,
    synthesizer: Arc<ConversationalSynthesizer>,
    threshold: f32,
}

impl ResolutionOrchestrator {
    pub fn new(
        matcher: Arc<SimilarityMatcher>,
        retriever: Arc<DocumentRetriever>,
        synthesizer: Arc<ConversationalSynthesizer>,
    ) -> Self {
        Self {
            matcher,
            retriever,
            synthesizer,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// A match must score strictly above `threshold` to be served from cache.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// One pass of match, then retrieve and synthesize on a miss. Failures
    /// are terminal for the turn and never retried here.
    #[instrument(skip(self, state), fields(threshold = self.threshold))]
    pub async fn resolve_stream<'a>(
        &self,
        state: &'a mut ConversationState,
        question: &str,
    ) -> Result<Resolution<'a>, ResolveError> {
        let matched = self.matcher.find_match(question);
        if matched.score > self.threshold {
            tracing::info!(score = matched.score, "answered from reference set");
            return Ok(Resolution::CacheHit(ComposedResponse::cached(
                matched.answer,
                matched.score,
                matched.media,
            )));
        }

        let documents = self
            .retriever
            .retrieve(question)
            .await
            .map_err(ResolveError::retrieval)?;
        let top_score = documents.first().map(|d| d.relevance_score);
        tracing::info!(
            match_score = matched.score,
            documents = documents.len(),
            "falling back to retrieval"
        );

        let answer = self
            .synthesizer
            .synthesize(question, state, &documents)
            .await
            .map_err(ResolveError::generation)?;

        Ok(Resolution::Generated(ResponseStream::new(answer, top_score)))
    }

    /// Resolves and collects the full response.
    pub async fn resolve(
        &self,
        state: &mut ConversationState,
        question: &str,
    ) -> Result<ComposedResponse, ResolveError> {
        match self.resolve_stream(state, question).await? {
            Resolution::CacheHit(response) => Ok(response),
            Resolution::Generated(mut stream) => {
                while let Some(fragment) = stream.next().await {
                    fragment?;
                }
                Ok(stream.into_response())
            }
        }
    }
}

/// Generated answer fragments followed by a single trailer fragment with
/// the score label and citations. Concatenated, the fragments equal
/// [`ComposedResponse::text`].
pub struct ResponseStream<'a> {
    answer: AnswerStream<'a>,
    top_score: Option<f32>,
    trailer_sent: bool,
    failed: bool,
}

impl<'a> ResponseStream<'a> {
    fn new(answer: AnswerStream<'a>, top_score: Option<f32>) -> Self {
        Self {
            answer,
            top_score,
            trailer_sent: false,
            failed: false,
        }
    }

    pub fn citations(&self) -> &[Citation] {
        self.answer.citations()
    }

    pub fn score_label(&self) -> String {
        score_label(self.top_score)
    }

    /// Response built from what has been received so far.
    pub fn into_response(self) -> ComposedResponse {
        ComposedResponse::generated(
            self.answer.answer(),
            self.top_score,
            self.answer.citations().to_vec(),
        )
    }
}

impl Stream for ResponseStream<'_> {
    type Item = Result<String, ResolveError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.failed || this.trailer_sent {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.answer).poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => Poll::Ready(Some(Ok(fragment))),
            Poll::Ready(Some(Err(err))) => {
                this.failed = true;
                Poll::Ready(Some(Err(ResolveError::generation(err))))
            }
            Poll::Ready(None) => {
                this.trailer_sent = true;
                let tail = trailer(&score_label(this.top_score), this.answer.citations());
                Poll::Ready(Some(Ok(tail)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
