//! In-memory conversation state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::Checkpoint;
use crate::types::{ThreadId, Turn};

use super::persona::Persona;

/// Everything one workflow run reads and writes.
///
/// Only `turns` and `summary` survive into a [`Checkpoint`]; the persona is
/// supplied again on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<Turn>,
    pub summary: String,
    pub persona: Persona,
}

impl ConversationState {
    /// Empty history and summary.
    pub fn new(persona: Persona) -> Self {
        Self {
            turns: Vec::new(),
            summary: String::new(),
            persona,
        }
    }

    /// Start from a checkpoint if there is one.
    pub fn resume(checkpoint: Option<Checkpoint>, persona: Persona) -> Self {
        match checkpoint {
            Some(checkpoint) => Self {
                turns: checkpoint.turns,
                summary: checkpoint.summary,
                persona,
            },
            None => Self::new(persona),
        }
    }

    pub fn with_turns(mut self, turns: impl IntoIterator<Item = Turn>) -> Self {
        self.turns.extend(turns);
        self
    }

    /// Drop the turns with the given ids, keeping the order of the rest.
    pub fn remove_turns(&mut self, ids: &[String]) {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.turns.retain(|turn| !ids.contains(turn.id()));
    }

    /// Project the persisted part of this state.
    pub fn to_checkpoint(&self, thread_id: &ThreadId) -> Checkpoint {
        Checkpoint::new(thread_id.clone(), self.turns.clone(), self.summary.clone())
    }
}
