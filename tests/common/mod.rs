//! Shared test helpers and scripted provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;

use philoagents::conversation::{
    ConversationService, Persona, ResponseChain, SummaryChain, Workflow,
};
use philoagents::error::PhiloError;
use philoagents::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use philoagents::store::StoreConnector;
use philoagents::types::*;

/// One scripted model call.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Answer with this text.
    Reply(String),
    /// Fail before producing anything.
    Fail(String),
    /// Stream this text, then fail. Non-streaming calls fail outright.
    FailAfter(String),
}

/// A deterministic provider that plays back queued answers and records
/// every request it receives.
///
/// When the queue is empty it answers `"Mock response"`. Streaming splits
/// the text into five-character chunks.
pub struct ScriptedProvider {
    model_id: String,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(model_id: &str) -> Arc<Self> {
        Arc::new(Self {
            model_id: model_id.to_string(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn queue_response(&self, text: &str) {
        self.push(Scripted::Reply(text.to_string()));
    }

    pub fn queue_failure(&self, message: &str) {
        self.push(Scripted::Fail(message.to_string()));
    }

    pub fn queue_failure_after(&self, partial: &str) {
        self.push(Scripted::FailAfter(partial.to_string()));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn push(&self, item: Scripted) {
        self.script.lock().unwrap().push_back(item);
    }

    fn next(&self, request: &ProviderRequest) -> Scripted {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply("Mock response".to_string()))
    }
}

fn usage() -> Usage {
    Usage {
        input_tokens: 10,
        output_tokens: 20,
        total_tokens: 30,
    }
}

fn chunks(text: &str) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(5)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, PhiloError> {
        match self.next(request) {
            Scripted::Reply(text) => Ok(ProviderResponse {
                text,
                usage: usage(),
                finish_reason: Some(FinishReason::Stop),
            }),
            Scripted::Fail(message) | Scripted::FailAfter(message) => {
                Err(PhiloError::api(500, message))
            }
        }
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, PhiloError>>, PhiloError> {
        let (text, fail) = match self.next(request) {
            Scripted::Reply(text) => (text, false),
            Scripted::Fail(message) => return Err(PhiloError::api(500, message)),
            Scripted::FailAfter(partial) => (partial, true),
        };

        let stream = async_stream::stream! {
            for chunk in chunks(&text) {
                yield Ok(TextStreamDelta::text(chunk));
            }
            if fail {
                yield Err(PhiloError::Stream("connection reset".to_string()));
            } else {
                yield Ok(TextStreamDelta::done(Some(FinishReason::Stop), Some(usage())));
            }
        };

        Ok(Box::pin(stream))
    }
}

pub fn socrates() -> Persona {
    Persona::builder()
        .id("socrates")
        .name("Socrates")
        .perspective("Knowledge begins with recognizing one's own ignorance")
        .style("Answers questions with questions")
        .context("Athens, 399 BC")
        .build()
}

pub fn workflow(
    response: Arc<ScriptedProvider>,
    summary: Arc<ScriptedProvider>,
    summary_trigger: usize,
    retain_after_summary: usize,
) -> Workflow {
    Workflow::new(
        ResponseChain::new(response),
        SummaryChain::new(summary),
        summary_trigger,
        retain_after_summary,
    )
}

pub fn service(
    response: Arc<ScriptedProvider>,
    summary: Arc<ScriptedProvider>,
    connector: Arc<dyn StoreConnector>,
) -> ConversationService {
    ConversationService::new(workflow(response, summary, 4, 2), connector)
}
