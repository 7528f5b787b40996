//! Groq model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Groq models (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GroqModel {
    #[strum(serialize = "llama-3.3-70b-versatile")]
    Llama3370bVersatile,
    #[strum(serialize = "llama-3.1-8b-instant")]
    Llama318bInstant,
    #[strum(serialize = "gemma2-9b-it")]
    Gemma29bIt,
    #[strum(default)]
    Custom(String),
}

impl GroqModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Llama3370bVersatile => "llama-3.3-70b-versatile",
            Self::Llama318bInstant => "llama-3.1-8b-instant",
            Self::Gemma29bIt => "gemma2-9b-it",
            Self::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn known_ids_parse_to_named_variants() {
        assert_eq!(
            GroqModel::from_str("llama-3.1-8b-instant").unwrap(),
            GroqModel::Llama318bInstant
        );
    }

    #[test]
    fn unknown_ids_are_kept_verbatim() {
        let model = GroqModel::from_str("qwen-qwq-32b").unwrap();
        assert_eq!(model.as_str(), "qwen-qwq-32b");
    }
}
