//! Error types for philoagents.

pub mod unified;

pub use unified::{ErrorCategory, WorkflowStage};

use thiserror::Error;

/// Primary error type for all philoagents operations.
#[derive(Error, Debug)]
pub enum PhiloError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Session store error: {0}")]
    Store(String),

    /// Top-level failure of one conversation run. Carries only the message of
    /// the error that aborted the run.
    #[error("Error running {stage}: {message}")]
    Workflow { stage: WorkflowStage, message: String },
}

impl PhiloError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap any error as a workflow failure for the given stage.
    pub fn workflow(stage: WorkflowStage, source: impl std::fmt::Display) -> Self {
        Self::Workflow {
            stage,
            message: source.to_string(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Serialization(_) | Self::Template(_) => ErrorCategory::Serialization,
            Self::Io(_) | Self::Store(_) => ErrorCategory::Store,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Workflow { .. } => ErrorCategory::Workflow,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PhiloError>;
