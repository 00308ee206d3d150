//! Bounded conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Turns kept per conversation.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Turns included in a prompt.
pub const DEFAULT_PROMPT_HISTORY: usize = 6;

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The visitor.
    User,
    /// The chatbot.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Assistant => f.write_str("Assistant"),
        }
    }
}

/// One utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker.
    pub role: Role,

    /// Text.
    pub content: String,

    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped now.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// The most recent turns of one conversation, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    limit: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    /// Create a history that keeps at most `limit` turns.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            turns: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Record a visitor message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::new(Role::User, content));
    }

    /// Record a chatbot reply.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::new(Role::Assistant, content));
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Turn> {
        self.turns.iter().skip(self.turns.len().saturating_sub(n))
    }

    /// The last `n` turns as `Role: text` lines.
    pub fn format_recent(&self, n: usize) -> String {
        self.recent(n)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All retained turns.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    /// Maximum retained turns.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of retained turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns are retained.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
