//! Error classification.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Broad error category for logging and caller-side routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Configuration,
    Validation,
    Serialization,
    Store,
    Workflow,
    Unknown,
}

/// Which public entry point a workflow failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum WorkflowStage {
    #[strum(serialize = "conversation workflow")]
    Conversation,
    #[strum(serialize = "streaming conversation workflow")]
    Streaming,
}
