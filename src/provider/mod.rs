//! Model provider trait and implementations.

pub mod http;
pub mod openai;

#[cfg(feature = "groq")]
pub mod groq;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::Settings;
use crate::error::PhiloError;
use crate::models::LanguageModel;
use crate::types::{FinishReason, GenerationSettings, ModelMessage, TextStreamDelta, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
}

impl ProviderRequest {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            settings: GenerationSettings::default(),
        }
    }
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "groq").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate text (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, PhiloError>;

    /// Generate text (streaming).
    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, PhiloError>>, PhiloError>;
}

/// Create a provider for the given model, using the provided settings.
#[allow(unused_variables)]
pub fn create_provider(
    model: &LanguageModel,
    settings: &Settings,
) -> Result<Box<dyn ModelProvider>, PhiloError> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    match model {
        #[cfg(feature = "groq")]
        LanguageModel::Groq(m) => {
            let api_key = settings
                .groq_api_key
                .clone()
                .ok_or_else(|| PhiloError::Authentication("Missing GROQ_API_KEY".into()))?;
            Ok(Box::new(
                groq::GroqProvider::new(m.clone(), api_key, Some(settings.groq_base_url.clone()))
                    .with_timeout(timeout),
            ))
        }
        #[cfg(feature = "openai-compatible")]
        LanguageModel::OpenAiCompatible(m) => {
            let api_key = settings
                .groq_api_key
                .clone()
                .ok_or_else(|| PhiloError::Authentication("Missing GROQ_API_KEY".into()))?;
            let base_url = m
                .base_url
                .clone()
                .unwrap_or_else(|| settings.groq_base_url.clone());
            Ok(Box::new(
                openai::OpenAiCompatibleProvider::new(
                    "openai-compatible",
                    m.model_id.clone(),
                    api_key,
                    base_url,
                )
                .with_timeout(timeout),
            ))
        }
        LanguageModel::Custom { provider, .. } => Err(PhiloError::ModelNotFound(format!(
            "No built-in provider for '{provider}'. Use groq or openai-compatible."
        ))),
        #[allow(unreachable_patterns)]
        _ => Err(PhiloError::ModelNotFound(format!(
            "Provider for model '{}' not enabled via feature flags",
            model
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelSelector;

    #[cfg(feature = "groq")]
    #[test]
    fn groq_provider_requires_api_key() {
        let model = ModelSelector::parse("groq:llama-3.3-70b-versatile").unwrap();
        let err = match create_provider(&model, &Settings::default()) {
            Ok(_) => panic!("expected missing key error"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("GROQ_API_KEY"), "unexpected error: {err}");
    }

    #[cfg(feature = "groq")]
    #[test]
    fn groq_provider_is_built_from_settings() {
        let model = ModelSelector::parse("groq:llama-3.1-8b-instant").unwrap();
        let settings = Settings::builder().groq_api_key("gsk-test").build();
        let provider = create_provider(&model, &settings).unwrap();
        assert_eq!(provider.provider_name(), "groq");
        assert_eq!(provider.model_id(), "llama-3.1-8b-instant");
    }

    #[test]
    fn custom_provider_is_rejected() {
        let model = ModelSelector::parse("somecloud:model").unwrap();
        let settings = Settings::builder().groq_api_key("gsk-test").build();
        assert!(matches!(
            create_provider(&model, &settings),
            Err(PhiloError::ModelNotFound(_))
        ));
    }
}
