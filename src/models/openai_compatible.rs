//! Models served by any OpenAI-compatible chat-completions endpoint.

use serde::{Deserialize, Serialize};

/// A model id plus an optional endpoint override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OpenAiCompatibleModel {
    pub model_id: String,
    pub base_url: Option<String>,
}

impl OpenAiCompatibleModel {
    pub fn new(model_id: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            model_id: model_id.into(),
            base_url,
        }
    }
}
