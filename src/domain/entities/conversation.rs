use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of question/answer pairs kept as generation context.
pub const DEFAULT_CONVERSATION_WINDOW: usize = 3;

/// One completed exchange fed back to the language model as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Bounded window of the most recent turns of a single session.
///
/// Pushing past the window drops the oldest turn, so `len() <= window()`
/// always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    window: usize,
    turns: VecDeque<Turn>,
}

impl ConversationState {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            turns: VecDeque::with_capacity(window),
        }
    }

    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        if self.window == 0 {
            return;
        }
        while self.turns.len() >= self.window {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn::new(question, answer));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Turns oldest-first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSATION_WINDOW)
    }
}

/// Fixed texts the assistant shows outside of generated answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedReplies {
    pub greeting: String,
    pub cleared_greeting: String,
    pub retrieval_failure: String,
    pub generation_failure: String,
}

/// Full chat log of a session as the user saw it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(session_id: Uuid, greeting: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            messages: vec![Message::new(MessageRole::Assistant, greeting)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        self.updated_at = Utc::now();
    }

    pub fn reset(&mut self, greeting: impl Into<String>) {
        self.messages = vec![Message::new(MessageRole::Assistant, greeting)];
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_drops_oldest_turn() {
        let mut state = ConversationState::new(3);
        for i in 0..5 {
            state.record(format!("q{i}"), format!("a{i}"));
        }

        assert_eq!(state.len(), 3);
        let questions: Vec<_> = state.turns().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut state = ConversationState::default();
        state.record("q", "a");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.window(), DEFAULT_CONVERSATION_WINDOW);
    }

    #[test]
    fn test_zero_window_keeps_nothing() {
        let mut state = ConversationState::new(0);
        state.record("q", "a");
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn test_transcript_reset_keeps_only_greeting() {
        let mut transcript = Transcript::new(Uuid::new_v4(), "Hi");
        transcript.add_message(MessageRole::User, "question");
        transcript.add_message(MessageRole::Assistant, "answer");
        assert_eq!(transcript.messages.len(), 3);

        transcript.reset("Hey");
        assert_eq!(transcript.messages, vec![Message::new(MessageRole::Assistant, "Hey")]);
    }
}
