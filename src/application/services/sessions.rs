use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::{ConversationState, DomainError, Transcript};

/// Per-session state. Never shared between sessions.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub conversation: ConversationState,
    pub transcript: Transcript,
}

impl Session {
    pub fn new(id: Uuid, window: usize, greeting: &str) -> Self {
        Self {
            id,
            conversation: ConversationState::new(window),
            transcript: Transcript::new(id, greeting),
        }
    }

    pub fn clear(&mut self, greeting: &str) {
        self.conversation.clear();
        self.transcript.reset(greeting);
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Live sessions. Identifiers are always issued here; callers can only
/// resume a session they were handed.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    window: usize,
    greeting: String,
}

impl SessionRegistry {
    pub fn new(window: usize, greeting: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            window,
            greeting: greeting.into(),
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id, self.window, &self.greeting)));
        self.sessions.write().await.insert(id, handle.clone());
        tracing::info!(session_id = %id, "session started");
        (id, handle)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Resumes the session `id`, or starts a new one when no id is given.
    /// Unknown ids, including evicted sessions, are not found.
    pub async fn open(&self, id: Option<Uuid>) -> Result<(Uuid, SessionHandle), DomainError> {
        match id {
            None => Ok(self.create().await),
            Some(id) => self
                .get(&id)
                .await
                .map(|handle| (id, handle))
                .ok_or_else(|| DomainError::not_found(format!("session {id}"))),
        }
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session ended");
        }
        removed
    }

    /// Drops sessions whose transcript has not changed for `max_idle`.
    /// Sessions with a turn in flight are skipped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) if now - session.transcript.updated_at > max_idle => {
                tracing::debug!(session_id = %id, "session evicted");
                false
            }
            _ => true,
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new(3, "Hi");
        let (a, handle_a) = registry.create().await;
        let (b, handle_b) = registry.create().await;
        assert_ne!(a, b);

        handle_a.lock().await.conversation.record("q", "a");

        assert_eq!(handle_a.lock().await.conversation.len(), 1);
        assert!(handle_b.lock().await.conversation.is_empty());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_open_resumes_known_session() {
        let registry = SessionRegistry::new(3, "Hi");
        let (id, handle) = registry.open(None).await.unwrap();
        handle.lock().await.conversation.record("q", "a");

        let (again_id, again) = registry.open(Some(id)).await.unwrap();

        assert_eq!(again_id, id);
        assert_eq!(again.lock().await.conversation.len(), 1);
        assert_eq!(again.lock().await.transcript.messages[0].content, "Hi");
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_id() {
        let registry = SessionRegistry::new(3, "Hi");

        let result = registry.open(Some(Uuid::new_v4())).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_sessions() {
        let registry = SessionRegistry::new(3, "Hi");
        let (stale, handle) = registry.create().await;
        let (fresh, _) = registry.create().await;
        handle.lock().await.transcript.updated_at = Utc::now() - chrono::Duration::hours(2);

        let evicted = registry.evict_idle(Duration::from_secs(3600)).await;

        assert_eq!(evicted, 1);
        assert!(registry.get(&stale).await.is_none());
        assert!(registry.get(&fresh).await.is_some());
        assert!(matches!(
            registry.open(Some(stale)).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_evict_idle_skips_busy_session() {
        let registry = SessionRegistry::new(3, "Hi");
        let (id, handle) = registry.create().await;
        let mut session = handle.lock().await;
        session.transcript.updated_at = Utc::now() - chrono::Duration::hours(2);

        assert_eq!(registry.evict_idle(Duration::from_secs(1)).await, 0);
        drop(session);
        assert_eq!(registry.evict_idle(Duration::from_secs(1)).await, 1);
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_window_and_transcript() {
        let mut session = Session::new(Uuid::new_v4(), 3, "Hi");
        session.conversation.record("q", "a");
        session
            .transcript
            .add_message(crate::domain::MessageRole::User, "q");

        session.clear("Hey");

        assert!(session.conversation.is_empty());
        assert_eq!(session.transcript.messages.len(), 1);
        assert_eq!(session.transcript.messages[0].content, "Hey");
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new(3, "Hi");
        let (id, _) = registry.create().await;
        assert!(registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
    }
}
