//! Configuration (layered: code > env/.env > literal defaults).
//!
//! [`Settings`] is immutable once built. Construct it with
//! [`Settings::builder`], [`Settings::from_env`] or
//! [`Settings::from_toml_file`] and pass it by reference.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{PhiloError, Result};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LLM_MODEL_SUMMARY: &str = "llama-3.1-8b-instant";
pub const DEFAULT_DB_NAME: &str = "philoagents";
pub const DEFAULT_CHECKPOINT_COLLECTION: &str = "philosopher_state_checkpoints";
pub const DEFAULT_LONG_TERM_MEMORY_COLLECTION: &str = "philosopher_long_term_memory";
pub const DEFAULT_SUMMARY_TRIGGER: usize = 4;
pub const DEFAULT_RETAIN_AFTER_SUMMARY: usize = 2;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Service settings.
#[derive(Clone, Builder, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// API key for Groq. Only needed when a Groq provider is built.
    #[builder(into)]
    pub groq_api_key: Option<String>,
    #[builder(into, default = DEFAULT_GROQ_BASE_URL.to_string())]
    pub groq_base_url: String,
    /// Model used by the conversation node, as `provider:model` or a bare
    /// Groq model id.
    #[builder(into, default = DEFAULT_LLM_MODEL.to_string())]
    pub llm_model: String,
    /// Model used by the summarize node.
    #[builder(into, default = DEFAULT_LLM_MODEL_SUMMARY.to_string())]
    pub llm_model_summary: String,
    /// Root directory of the file-backed session store.
    #[builder(into, default = default_data_dir())]
    pub data_dir: PathBuf,
    #[builder(into, default = DEFAULT_DB_NAME.to_string())]
    pub db_name: String,
    #[builder(into, default = DEFAULT_CHECKPOINT_COLLECTION.to_string())]
    pub checkpoint_collection: String,
    #[builder(into, default = DEFAULT_LONG_TERM_MEMORY_COLLECTION.to_string())]
    pub long_term_memory_collection: String,
    /// Summarize once a thread holds strictly more turns than this.
    #[builder(default = DEFAULT_SUMMARY_TRIGGER)]
    pub summary_trigger: usize,
    /// Turns kept after a summarize pass.
    #[builder(default = DEFAULT_RETAIN_AFTER_SUMMARY)]
    pub retain_after_summary: usize,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| ".."))
            .field("groq_base_url", &self.groq_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_model_summary", &self.llm_model_summary)
            .field("data_dir", &self.data_dir)
            .field("db_name", &self.db_name)
            .field("checkpoint_collection", &self.checkpoint_collection)
            .field("long_term_memory_collection", &self.long_term_memory_collection)
            .field("summary_trigger", &self.summary_trigger)
            .field("retain_after_summary", &self.retain_after_summary)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Settings {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to the literal defaults. Numeric variables
    /// that fail to parse are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        settings.groq_api_key = lookup("GROQ_API_KEY").filter(|v| !v.trim().is_empty());

        let string_mappings: [(&str, &mut String); 6] = [
            ("GROQ_BASE_URL", &mut settings.groq_base_url),
            ("GROQ_LLM_MODEL", &mut settings.llm_model),
            ("GROQ_LLM_MODEL_SUMMARY", &mut settings.llm_model_summary),
            ("PHILOAGENTS_DB_NAME", &mut settings.db_name),
            (
                "PHILOAGENTS_STATE_CHECKPOINT_COLLECTION",
                &mut settings.checkpoint_collection,
            ),
            (
                "PHILOAGENTS_LONG_TERM_MEMORY_COLLECTION",
                &mut settings.long_term_memory_collection,
            ),
        ];
        for (var, slot) in string_mappings {
            if let Some(value) = lookup(var) {
                *slot = value;
            }
        }

        if let Some(dir) = lookup("PHILOAGENTS_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("TOTAL_MESSAGES_SUMMARY_TRIGGER") {
            settings.summary_trigger = parse_var("TOTAL_MESSAGES_SUMMARY_TRIGGER", &raw)?;
        }
        if let Some(raw) = lookup("TOTAL_MESSAGES_AFTER_SUMMARY") {
            settings.retain_after_summary = parse_var("TOTAL_MESSAGES_AFTER_SUMMARY", &raw)?;
        }
        if let Some(raw) = lookup("PHILOAGENTS_REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = parse_var("PHILOAGENTS_REQUEST_TIMEOUT_SECS", &raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load from a TOML file. Missing keys take the literal defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&raw).map_err(|e| {
            PhiloError::Configuration(format!("{}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    ///
    /// `retain_after_summary` may not exceed `summary_trigger`, even though
    /// the pair is otherwise unconstrained. A `retain_after_summary` of 0 is
    /// accepted and makes a summarize pass drop every turn, not none.
    pub fn validate(&self) -> Result<()> {
        if self.retain_after_summary > self.summary_trigger {
            return Err(PhiloError::Configuration(format!(
                "TOTAL_MESSAGES_AFTER_SUMMARY ({}) must not exceed TOTAL_MESSAGES_SUMMARY_TRIGGER ({})",
                self.retain_after_summary, self.summary_trigger
            )));
        }
        if self.db_name.trim().is_empty() || self.checkpoint_collection.trim().is_empty() {
            return Err(PhiloError::Configuration(
                "database and checkpoint collection names must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &str, raw: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| PhiloError::Configuration(format!("{var}={raw:?}: {e}")))
}

fn default_data_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".philoagents"))
        .unwrap_or_else(|| PathBuf::from(".philoagents"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_literal_fallbacks() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.llm_model, DEFAULT_LLM_MODEL);
        assert_eq!(settings.llm_model_summary, DEFAULT_LLM_MODEL_SUMMARY);
        assert_eq!(settings.summary_trigger, 4);
        assert_eq!(settings.retain_after_summary, 2);
        assert_eq!(settings.groq_api_key, None);
        assert_eq!(settings.checkpoint_collection, DEFAULT_CHECKPOINT_COLLECTION);
    }

    #[test]
    fn env_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("GROQ_LLM_MODEL", "llama-3.1-8b-instant"),
            ("TOTAL_MESSAGES_SUMMARY_TRIGGER", "10"),
            ("TOTAL_MESSAGES_AFTER_SUMMARY", "5"),
            ("PHILOAGENTS_DATA_DIR", "/tmp/philo"),
        ]))
        .unwrap();
        assert_eq!(settings.groq_api_key.as_deref(), Some("gsk-test"));
        assert_eq!(settings.llm_model, "llama-3.1-8b-instant");
        assert_eq!(settings.summary_trigger, 10);
        assert_eq!(settings.retain_after_summary, 5);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/philo"));
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let settings = Settings::from_lookup(lookup_from(&[("GROQ_API_KEY", "  ")])).unwrap();
        assert_eq!(settings.groq_api_key, None);
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("TOTAL_MESSAGES_SUMMARY_TRIGGER", "four")]))
            .unwrap_err();
        assert!(matches!(err, PhiloError::Configuration(_)));
        assert!(err.to_string().contains("TOTAL_MESSAGES_SUMMARY_TRIGGER"));
    }

    #[test]
    fn retain_larger_than_trigger_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            ("TOTAL_MESSAGES_SUMMARY_TRIGGER", "2"),
            ("TOTAL_MESSAGES_AFTER_SUMMARY", "3"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PhiloError::Configuration(_)));
    }

    #[test]
    fn retain_zero_is_accepted() {
        let settings =
            Settings::from_lookup(lookup_from(&[("TOTAL_MESSAGES_AFTER_SUMMARY", "0")])).unwrap();
        assert_eq!(settings.retain_after_summary, 0);
    }

    #[test]
    fn toml_file_fills_missing_keys_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm_model = \"groq:llama-3.1-8b-instant\"").unwrap();
        writeln!(file, "summary_trigger = 6").unwrap();

        let settings = Settings::from_toml_file(file.path()).unwrap();
        assert_eq!(settings.llm_model, "groq:llama-3.1-8b-instant");
        assert_eq!(settings.summary_trigger, 6);
        assert_eq!(settings.retain_after_summary, DEFAULT_RETAIN_AFTER_SUMMARY);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let settings = Settings::builder().groq_api_key("gsk-secret").build();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("gsk-secret"));
    }
}
