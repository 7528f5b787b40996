//! Conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::ModelMessage;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Agent,
}

/// A single utterance in a conversation.
///
/// Turns are immutable once created. The `id` is stable across checkpoints
/// and is what pruning uses to decide which turns to drop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    id: String,
    author: Author,
    content: String,
    created_at: DateTime<Utc>,
}

impl Turn {
    /// A turn authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    /// A turn authored by the agent.
    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Author::Agent, content)
    }

    fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Convert into the provider wire format.
    pub fn to_model_message(&self) -> ModelMessage {
        match self.author {
            Author::User => ModelMessage::user(self.content.clone()),
            Author::Agent => ModelMessage::assistant(self.content.clone()),
        }
    }
}
