//! The philosopher a conversation is held with.

use std::fmt;

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Caller-supplied persona fields.
///
/// These shape one invocation only and are never written to a checkpoint.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq, Default)]
#[builder(on(String, into))]
pub struct Persona {
    /// Stable identifier; doubles as the default thread id.
    pub id: String,
    pub name: String,
    /// The philosopher's theoretical views.
    pub perspective: String,
    /// How the philosopher talks.
    pub style: String,
    /// Free-text background passed into the prompt.
    #[builder(default)]
    pub context: String,
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Persona(id={}, name={}, perspective={}, style={})",
            self.id, self.name, self.perspective, self.style
        )
    }
}
