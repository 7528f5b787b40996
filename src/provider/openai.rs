//! OpenAI-compatible Chat Completions provider.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::error::PhiloError;
use crate::types::*;

use super::http::{bearer_headers, parse_sse_data, shared_client, status_to_error, SseLineBuffer};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

/// Talks to any endpoint serving `POST {base_url}/chat/completions`.
pub struct OpenAiCompatibleProvider {
    provider_name: String,
    model_id: String,
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        provider_name: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            model_id: model_id.into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_request_body(&self, request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(|m| serde_json::json!({ "role": m.role.as_str(), "content": m.content }))
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": messages,
            "stream": stream,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(max) = request.settings.max_tokens {
                obj.insert("max_tokens".into(), max.into());
            }
            if let Some(temp) = request.settings.temperature {
                obj.insert("temperature".into(), temp.into());
            }
            if let Some(top_p) = request.settings.top_p {
                obj.insert("top_p".into(), top_p.into());
            }
            if let Some(ref stops) = request.settings.stop_sequences {
                obj.insert("stop".into(), serde_json::json!(stops));
            }
            if let Some(seed) = request.settings.seed {
                obj.insert("seed".into(), seed.into());
            }
            if let Some(ref user) = request.settings.user {
                obj.insert("user".into(), user.clone().into());
            }
        }

        body
    }

    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response, PhiloError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, PhiloError> {
        let body = self.build_request_body(request, false);

        debug!(provider = %self.provider_name, model = %self.model_id, "generate_text");

        let data: ChatResponse = self.post(&body).await?.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PhiloError::api(200, "No choices in chat completion response"))?;

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data.usage.map(Usage::from).unwrap_or_default(),
            finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        })
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, PhiloError>>, PhiloError> {
        let body = self.build_request_body(request, true);

        debug!(provider = %self.provider_name, model = %self.model_id, "stream_text");

        let byte_stream = self.post(&body).await?.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = SseLineBuffer::default();
            let mut ended = false;
            futures::pin_mut!(byte_stream);

            loop {
                let line = match lines.next_line() {
                    Some(line) => line,
                    None if ended => match lines.finish() {
                        Some(line) => line,
                        None => break,
                    },
                    None => {
                        match byte_stream.next().await {
                            Some(Ok(chunk)) => lines.push(&chunk),
                            Some(Err(e)) => {
                                yield Err(PhiloError::Network(e));
                                return;
                            }
                            None => ended = true,
                        }
                        continue;
                    }
                };

                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                match parse_stream_line(&line) {
                    StreamLine::Skip => {}
                    StreamLine::Deltas(deltas) => {
                        for delta in deltas {
                            yield Ok(delta);
                        }
                    }
                    StreamLine::Failed(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// What one SSE line contributes to the delta stream.
enum StreamLine {
    Skip,
    Deltas(Vec<TextStreamDelta>),
    Failed(PhiloError),
}

fn parse_stream_line(line: &str) -> StreamLine {
    if line.is_empty() || line.starts_with(':') {
        return StreamLine::Skip;
    }
    let Some(data) = parse_sse_data(line) else {
        return StreamLine::Skip;
    };

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(StreamChunk { error: Some(err), .. }) => {
            StreamLine::Failed(PhiloError::Stream(err.message))
        }
        Ok(chunk) => {
            let usage = chunk.usage.map(Usage::from);
            let Some(choice) = chunk.choices.into_iter().next() else {
                return StreamLine::Skip;
            };
            let mut deltas = Vec::new();
            let text = choice.delta.content.unwrap_or_default();
            if !text.is_empty() {
                deltas.push(TextStreamDelta::text(text));
            }
            let finish = choice.finish_reason.as_deref().and_then(parse_finish_reason);
            if finish.is_some() {
                deltas.push(TextStreamDelta::done(finish, usage));
            }
            StreamLine::Deltas(deltas)
        }
        Err(e) => {
            debug!(error = %e, "skipping unparseable stream chunk");
            StreamLine::Skip
        }
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

// Chat Completions wire types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ChatUsage> for Usage {
    fn from(u: ChatUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<ChatUsage>,
    error: Option<StreamError>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_roles_and_settings() {
        let provider = OpenAiCompatibleProvider::new("groq", "llama", "key", "https://x.test/v1/");
        let mut request = ProviderRequest::new(vec![
            ModelMessage::system("be Socrates"),
            ModelMessage::user("hello"),
        ]);
        request.settings.temperature = Some(0.7);

        let body = provider.build_request_body(&request, true);
        assert_eq!(body["model"], "llama");
        assert_eq!(body["stream"], true);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!(body.get("max_tokens").is_none());
        assert_eq!(provider.base_url, "https://x.test/v1");
    }
}
