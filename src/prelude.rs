//! Convenience re-exports for common use.

pub use crate::config::Settings;
pub use crate::conversation::{
    ConversationService, ConversationState, MessageInput, MessageRecord, Persona,
};
pub use crate::error::{PhiloError, Result};
pub use crate::models::LanguageModel;
pub use crate::provider::ModelProvider;
pub use crate::store::{SessionStore, StoreConnector};
pub use crate::types::{ThreadId, Turn};
