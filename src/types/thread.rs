//! Thread identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which a conversation is checkpointed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Pick the thread for a persona.
    ///
    /// Without `new_thread` every call for the same persona lands on the
    /// persona's own thread. With it, a fresh `"{persona_id}-{uuid}"` thread
    /// is started.
    pub fn resolve(persona_id: &str, new_thread: bool) -> Self {
        if new_thread {
            Self(format!("{persona_id}-{}", Uuid::new_v4()))
        } else {
            Self(persona_id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_thread_reuses_persona_id() {
        let a = ThreadId::resolve("socrates", false);
        let b = ThreadId::resolve("socrates", false);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "socrates");
    }

    #[test]
    fn new_threads_are_unique_and_derived_from_persona() {
        let a = ThreadId::resolve("socrates", true);
        let b = ThreadId::resolve("socrates", true);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("socrates-"));
    }
}
