use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::instrument;
use uuid::Uuid;

use crate::application::services::{Resolution, ResolutionOrchestrator, Session, SessionRegistry};
use crate::domain::{
    ports::TranscriptStore, CannedReplies, ComposedResponse, ConversationState, DomainError,
    MessageRole, ResolveError, Transcript, TranscriptRecord,
};

/// Streamed progress of one turn.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// Images attached to a reference answer, sent before its text.
    Media(Vec<String>),
    Fragment(String),
    Done(ComposedResponse),
    Failed { message: String, retryable: bool },
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub response: ComposedResponse,
}

/// A turn that failed, with the text shown to the user in its place.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct TurnFailure {
    pub session_id: Uuid,
    pub message: String,
    #[source]
    pub error: ResolveError,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Session(#[from] DomainError),
    #[error(transparent)]
    Turn(#[from] TurnFailure),
}

/// Runs turns for sessions: transcript bookkeeping around the orchestrator
/// plus a transcript record after every turn.
pub struct ChatService {
    orchestrator: Arc<ResolutionOrchestrator>,
    sessions: Arc<SessionRegistry>,
    transcripts: Arc<dyn TranscriptStore>,
    replies: CannedReplies,
}

impl ChatService {
    pub fn new(
        orchestrator: Arc<ResolutionOrchestrator>,
        sessions: Arc<SessionRegistry>,
        transcripts: Arc<dyn TranscriptStore>,
        replies: CannedReplies,
    ) -> Self {
        Self {
            orchestrator,
            sessions,
            transcripts,
            replies,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    #[instrument(skip(self, question))]
    pub async fn ask(
        &self,
        session_id: Option<Uuid>,
        question: &str,
    ) -> Result<ChatReply, ChatError> {
        let (session_id, handle) = self.sessions.open(session_id).await?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;

        session.transcript.add_message(MessageRole::User, question);
        let result = self
            .orchestrator
            .resolve(&mut session.conversation, question)
            .await;

        let outcome = match result {
            Ok(response) => {
                session.transcript.add_message(MessageRole::Assistant, response.text());
                Ok(ChatReply {
                    session_id,
                    response,
                })
            }
            Err(error) => {
                let message = self.failure_message(&error);
                session.transcript.add_message(MessageRole::Assistant, &message);
                Err(TurnFailure {
                    session_id,
                    message,
                    error,
                })
            }
        };

        self.persist(session).await;
        Ok(outcome?)
    }

    /// Like [`ask`](Self::ask) but forwards fragments as they arrive. The
    /// turn runs on its own task and completes even if the receiver goes away.
    pub async fn ask_stream(
        self: &Arc<Self>,
        session_id: Option<Uuid>,
        question: &str,
    ) -> Result<(Uuid, mpsc::Receiver<TurnEvent>), DomainError> {
        let (session_id, handle) = self.sessions.open(session_id).await?;
        let (tx, rx) = mpsc::channel(64);
        let service = Arc::clone(self);
        let question = question.to_string();

        tokio::spawn(async move {
            let mut guard = handle.lock_owned().await;
            let session = &mut *guard;
            session.transcript.add_message(MessageRole::User, &question);

            let reply = match service
                .stream_turn(&mut session.conversation, &question, &tx)
                .await
            {
                Ok(response) => response.text(),
                Err(error) => {
                    tracing::warn!(session_id = %session.id, error = %error, "turn failed");
                    let message = service.failure_message(&error);
                    let _ = tx
                        .send(TurnEvent::Failed {
                            message: message.clone(),
                            retryable: matches!(error, ResolveError::Generation(_)),
                        })
                        .await;
                    message
                }
            };

            session.transcript.add_message(MessageRole::Assistant, reply);
            service.persist(session).await;
        });

        Ok((session_id, rx))
    }

    async fn stream_turn(
        &self,
        state: &mut ConversationState,
        question: &str,
        tx: &mpsc::Sender<TurnEvent>,
    ) -> Result<ComposedResponse, ResolveError> {
        match self.orchestrator.resolve_stream(state, question).await? {
            Resolution::CacheHit(response) => {
                if !response.media.is_empty() {
                    let _ = tx.send(TurnEvent::Media(response.media.clone())).await;
                }
                let _ = tx.send(TurnEvent::Fragment(response.text())).await;
                let _ = tx.send(TurnEvent::Done(response.clone())).await;
                Ok(response)
            }
            Resolution::Generated(mut stream) => {
                while let Some(fragment) = stream.next().await {
                    let _ = tx.send(TurnEvent::Fragment(fragment?)).await;
                }
                let response = stream.into_response();
                let _ = tx.send(TurnEvent::Done(response.clone())).await;
                Ok(response)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: &Uuid) -> Result<(), DomainError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| DomainError::not_found(format!("session {session_id}")))?;
        let mut session = handle.lock().await;
        session.clear(&self.replies.cleared_greeting);
        tracing::info!("conversation cleared");
        self.persist(&session).await;
        Ok(())
    }

    pub async fn transcript(&self, session_id: &Uuid) -> Result<Transcript, DomainError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| DomainError::not_found(format!("session {session_id}")))?;
        let session = handle.lock().await;
        Ok(session.transcript.clone())
    }

    fn failure_message(&self, error: &ResolveError) -> String {
        match error {
            ResolveError::Retrieval(_) => self.replies.retrieval_failure.clone(),
            ResolveError::Generation(_) => self.replies.generation_failure.clone(),
        }
    }

    async fn persist(&self, session: &Session) {
        let record = TranscriptRecord::new(session.id, session.transcript.messages.clone());
        if let Err(e) = self.transcripts.append(&record).await {
            tracing::warn!(session_id = %session.id, error = %e, "failed to persist transcript");
        }
    }
}
