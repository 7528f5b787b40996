//! Model selection and parsing.

use std::str::FromStr;

use super::LanguageModel;
use crate::error::PhiloError;

/// Parse a "provider:model" string into a LanguageModel.
pub struct ModelSelector;

impl ModelSelector {
    /// Parse "provider:model_id" into a LanguageModel.
    ///
    /// Examples: "groq:llama-3.3-70b-versatile", "openai-compatible:my-model"
    pub fn parse(s: &str) -> Result<LanguageModel, PhiloError> {
        let (provider, model_id) = s.split_once(':').ok_or_else(|| {
            PhiloError::Configuration(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            ))
        })?;
        if model_id.is_empty() {
            return Err(PhiloError::Configuration(format!(
                "Invalid model selector '{s}': empty model id"
            )));
        }

        match provider {
            #[cfg(feature = "groq")]
            "groq" => {
                use super::groq::GroqModel;
                let m = GroqModel::from_str(model_id)
                    .unwrap_or(GroqModel::Custom(model_id.to_string()));
                Ok(LanguageModel::Groq(m))
            }
            #[cfg(feature = "openai-compatible")]
            "openai-compatible" | "openai_compatible" => {
                use super::openai_compatible::OpenAiCompatibleModel;
                Ok(LanguageModel::OpenAiCompatible(OpenAiCompatibleModel::new(
                    model_id, None,
                )))
            }
            _ => Ok(LanguageModel::Custom {
                provider: provider.to_string(),
                model_id: model_id.to_string(),
            }),
        }
    }

    /// Like [`ModelSelector::parse`], but a bare model id (no `provider:`
    /// prefix) is routed to `default_provider`.
    ///
    /// The `GROQ_LLM_MODEL*` settings hold bare Groq ids, so this is what the
    /// service uses.
    pub fn parse_with_default(
        s: &str,
        default_provider: &str,
    ) -> Result<LanguageModel, PhiloError> {
        if s.contains(':') {
            Self::parse(s)
        } else {
            Self::parse(&format!("{default_provider}:{s}"))
        }
    }
}

impl FromStr for LanguageModel {
    type Err = PhiloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSelector::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "groq")]
    #[test]
    fn parse_groq_known_model() {
        let model = ModelSelector::parse("groq:llama-3.3-70b-versatile").unwrap();
        assert_eq!(model.provider_name(), "groq");
        assert_eq!(model.model_id(), "llama-3.3-70b-versatile");
    }

    #[cfg(feature = "groq")]
    #[test]
    fn bare_id_routes_to_default_provider() {
        let model = ModelSelector::parse_with_default("llama-3.1-8b-instant", "groq").unwrap();
        assert_eq!(model.to_string(), "groq:llama-3.1-8b-instant");
    }

    #[cfg(feature = "openai-compatible")]
    #[test]
    fn parse_openai_compatible_keeps_colons_in_model_id() {
        let model = ModelSelector::parse("openai-compatible:ft:llama:my-org").unwrap();
        assert_eq!(model.provider_name(), "openai-compatible");
        assert_eq!(model.model_id(), "ft:llama:my-org");
    }

    #[test]
    fn parse_unknown_provider_becomes_custom() {
        let model = ModelSelector::parse("somecloud:my-model").unwrap();
        assert_eq!(model.provider_name(), "somecloud");
        assert_eq!(model.model_id(), "my-model");
    }

    #[test]
    fn parse_missing_colon_is_error() {
        assert!(ModelSelector::parse("llama-3.3-70b-versatile").is_err());
    }

    #[test]
    fn parse_empty_model_id_is_error() {
        assert!(ModelSelector::parse("groq:").is_err());
    }
}
