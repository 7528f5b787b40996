//! Response and summary chains.
//!
//! A chain renders one prompt and makes exactly one model call. Neither
//! retries; provider errors propagate unchanged.

use std::sync::Arc;

use futures::StreamExt;
use minijinja::context;
use tracing::debug;

use crate::error::Result;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::types::{GenerationSettings, ModelMessage, StreamEventType, Turn, Usage};

use super::prompts::{CHARACTER_CARD, EXTEND_SUMMARY_PROMPT, SUMMARY_PROMPT};
use super::state::ConversationState;

const RESPONSE_TEMPERATURE: f64 = 0.7;

/// Produces the philosopher's next turn.
#[derive(Clone)]
pub struct ResponseChain {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

impl ResponseChain {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            settings: GenerationSettings::builder()
                .temperature(RESPONSE_TEMPERATURE)
                .build(),
        }
    }

    /// Character card as the system message, then the full history.
    pub fn build_request(&self, state: &ConversationState) -> Result<ProviderRequest> {
        let persona = &state.persona;
        let card = CHARACTER_CARD.render(context! {
            philosopher_name => persona.name,
            philosopher_perspective => persona.perspective,
            philosopher_style => persona.style,
            philosopher_context => persona.context,
            summary => state.summary,
        })?;

        let mut messages = Vec::with_capacity(state.turns.len() + 1);
        messages.push(ModelMessage::system(card));
        messages.extend(state.turns.iter().map(Turn::to_model_message));

        Ok(ProviderRequest {
            messages,
            settings: self.settings.clone(),
        })
    }

    /// Call the model and wait for the whole reply.
    pub async fn invoke(&self, state: &ConversationState) -> Result<Turn> {
        let request = self.build_request(state)?;
        let response = self.provider.generate_text(&request).await?;
        log_usage("response", self.provider.as_ref(), &response.usage);
        Ok(Turn::agent(response.text))
    }

    /// Call the model in streaming mode, handing each text fragment to
    /// `on_delta` as it arrives. Returns the assembled turn.
    pub async fn stream(
        &self,
        state: &ConversationState,
        on_delta: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<Turn> {
        let request = self.build_request(state)?;
        let mut stream = self.provider.stream_text(&request).await?;

        let mut text = String::new();
        let mut usage = Usage::default();
        while let Some(delta) = stream.next().await {
            let delta = delta?;
            if let Some(u) = delta.usage {
                usage = u;
            }
            if delta.event_type == StreamEventType::TextDelta && !delta.text.is_empty() {
                on_delta(&delta.text);
                text.push_str(&delta.text);
            }
        }
        log_usage("response", self.provider.as_ref(), &usage);

        Ok(Turn::agent(text))
    }
}

/// Folds the history into the running summary.
#[derive(Clone)]
pub struct SummaryChain {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

impl SummaryChain {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            settings: GenerationSettings::default(),
        }
    }

    /// Full history followed by the summary instruction as a user message.
    ///
    /// An empty summary asks for a fresh one; otherwise the existing summary
    /// is extended.
    pub fn build_request(&self, state: &ConversationState) -> Result<ProviderRequest> {
        let instruction = if state.summary.is_empty() {
            SUMMARY_PROMPT.render(context! {
                philosopher_name => state.persona.name,
            })?
        } else {
            EXTEND_SUMMARY_PROMPT.render(context! {
                philosopher_name => state.persona.name,
                summary => state.summary,
            })?
        };

        let mut messages: Vec<ModelMessage> =
            state.turns.iter().map(Turn::to_model_message).collect();
        messages.push(ModelMessage::user(instruction));

        Ok(ProviderRequest {
            messages,
            settings: self.settings.clone(),
        })
    }

    pub async fn invoke(&self, state: &ConversationState) -> Result<String> {
        let request = self.build_request(state)?;
        let response = self.provider.generate_text(&request).await?;
        log_usage("summary", self.provider.as_ref(), &response.usage);
        Ok(response.text)
    }
}

fn log_usage(chain: &str, provider: &dyn ModelProvider, usage: &Usage) {
    debug!(
        chain,
        provider = provider.provider_name(),
        model = provider.model_id(),
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "chain finished"
    );
}
