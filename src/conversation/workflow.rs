//! The conversation state machine.
//!
//! ```text
//! start -> conversation -> end
//!                       \-> summarize -> end
//! ```
//!
//! `conversation` always runs. `summarize` runs when the history holds more
//! turns than the trigger, at most once per run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::Result;
use crate::types::Turn;

use super::chains::{ResponseChain, SummaryChain};
use super::state::ConversationState;

/// Workflow nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Node {
    Start,
    Conversation,
    Summarize,
    End,
}

/// Events emitted while a run progresses.
///
/// Only [`WorkflowEvent::AgentDelta`] is text meant for the caller; every
/// other variant describes internal progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    NodeStarted { node: Node },
    NodeFinished { node: Node },
    /// A fragment of the agent's reply, produced by the conversation node.
    AgentDelta { text: String },
    Summarized { removed_turn_ids: Vec<String> },
}

impl WorkflowEvent {
    /// The caller-visible text carried by this event, if any.
    pub fn agent_text(&self) -> Option<&str> {
        match self {
            Self::AgentDelta { text } => Some(text),
            _ => None,
        }
    }
}

/// Callback used for streaming workflow events.
pub type WorkflowEventSink = Arc<dyn Fn(WorkflowEvent) + Send + Sync>;

/// Result of one run.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub state: ConversationState,
    /// The turn produced by the conversation node.
    pub reply: Turn,
    pub summarized: bool,
}

/// Two-node conversation workflow.
#[derive(Clone)]
pub struct Workflow {
    response: ResponseChain,
    summary: SummaryChain,
    summary_trigger: usize,
    retain_after_summary: usize,
}

impl Workflow {
    pub fn new(
        response: ResponseChain,
        summary: SummaryChain,
        summary_trigger: usize,
        retain_after_summary: usize,
    ) -> Self {
        Self {
            response,
            summary,
            summary_trigger,
            retain_after_summary,
        }
    }

    /// Take the thresholds from settings.
    pub fn from_settings(
        response: ResponseChain,
        summary: SummaryChain,
        settings: &Settings,
    ) -> Self {
        Self::new(
            response,
            summary,
            settings.summary_trigger,
            settings.retain_after_summary,
        )
    }

    /// Transition function.
    pub fn next_node(&self, node: Node, state: &ConversationState) -> Node {
        match node {
            Node::Start => Node::Conversation,
            Node::Conversation if state.turns.len() > self.summary_trigger => Node::Summarize,
            Node::Conversation => Node::End,
            Node::Summarize | Node::End => Node::End,
        }
    }

    /// Run to completion, waiting for whole model replies.
    pub async fn invoke(&self, state: ConversationState) -> Result<WorkflowRun> {
        self.execute(state, None).await
    }

    /// Run to completion, streaming the reply through `sink`.
    pub async fn stream(
        &self,
        state: ConversationState,
        sink: WorkflowEventSink,
    ) -> Result<WorkflowRun> {
        self.execute(state, Some(sink)).await
    }

    async fn execute(
        &self,
        mut state: ConversationState,
        sink: Option<WorkflowEventSink>,
    ) -> Result<WorkflowRun> {
        let emit = |event: WorkflowEvent| {
            if let Some(sink) = &sink {
                sink(event);
            }
        };

        let mut node = Node::Start;
        let mut reply = None;
        let mut summarized = false;

        loop {
            debug!(%node, turns = state.turns.len(), "workflow node");
            match node {
                Node::Start => {}
                Node::Conversation => {
                    emit(WorkflowEvent::NodeStarted { node });
                    let turn = match &sink {
                        Some(sink) => {
                            let on_delta = |text: &str| {
                                sink(WorkflowEvent::AgentDelta {
                                    text: text.to_string(),
                                })
                            };
                            self.response.stream(&state, &on_delta).await?
                        }
                        None => self.response.invoke(&state).await?,
                    };
                    state.turns.push(turn.clone());
                    reply = Some(turn);
                    emit(WorkflowEvent::NodeFinished { node });
                }
                Node::Summarize => {
                    emit(WorkflowEvent::NodeStarted { node });
                    let removed_turn_ids = self.summarize(&mut state).await?;
                    summarized = true;
                    emit(WorkflowEvent::Summarized { removed_turn_ids });
                    emit(WorkflowEvent::NodeFinished { node });
                }
                Node::End => break,
            }
            node = self.next_node(node, &state);
        }

        let reply = reply.unwrap_or_else(|| Turn::agent(String::new()));
        Ok(WorkflowRun {
            state,
            reply,
            summarized,
        })
    }

    /// Replace the summary and prune all but the newest turns.
    ///
    /// Returns the ids of the removed turns.
    async fn summarize(&self, state: &mut ConversationState) -> Result<Vec<String>> {
        let summary = self.summary.invoke(state).await?;

        let keep_from = state.turns.len().saturating_sub(self.retain_after_summary);
        let removed: Vec<String> = state.turns[..keep_from]
            .iter()
            .map(|turn| turn.id().to_string())
            .collect();

        state.summary = summary;
        state.remove_turns(&removed);

        info!(
            removed = removed.len(),
            kept = state.turns.len(),
            "conversation summarized"
        );
        Ok(removed)
    }
}
