//! Groq provider (OpenAI-compatible).

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::DEFAULT_GROQ_BASE_URL;
use crate::error::PhiloError;
use crate::models::groq::GroqModel;
use crate::types::TextStreamDelta;

use super::openai::OpenAiCompatibleProvider;
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub struct GroqProvider {
    inner: OpenAiCompatibleProvider,
}

impl GroqProvider {
    pub fn new(model: GroqModel, api_key: String, base_url: Option<String>) -> Self {
        Self {
            inner: OpenAiCompatibleProvider::new(
                "groq",
                model.as_str(),
                api_key,
                base_url.unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            ),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl ModelProvider for GroqProvider {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, PhiloError> {
        self.inner.generate_text(request).await
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, PhiloError>>, PhiloError> {
        self.inner.stream_text(request).await
    }
}
