//! In-process conversation memory keyed by session id

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::llm::ChatMessage;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            Role::User => ChatMessage::user(self.content.clone()),
            Role::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// Conversation state of one session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_id: String,
    pub turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Process-wide session history
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct HistoryStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session's turns, creating an empty session if unknown
    pub fn get_or_create(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Created session {}", session_id);
                Session::new(session_id)
            })
            .turns
            .clone()
    }

    /// Snapshot of a session without creating it
    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Append one user/assistant pair under the session's entry lock
    pub fn append_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        session.turns.push(Turn::user(question));
        session.turns.push(Turn::assistant(answer));
        session.updated_at = Utc::now();
        debug!(
            "Session {} now has {} turns",
            session_id,
            session.turns.len()
        );
    }

    /// Forget a session's turns; returns whether it existed
    pub fn reset(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn turn_count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map_or(0, |s| s.turns.len())
    }
}
