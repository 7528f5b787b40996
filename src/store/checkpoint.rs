use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ThreadId, Turn};

pub const CHECKPOINT_VERSION: u32 = 1;

/// Persisted snapshot of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub thread_id: ThreadId,
    pub turns: Vec<Turn>,
    #[serde(default)]
    pub summary: String,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: ThreadId, turns: Vec<Turn>, summary: String) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            thread_id,
            turns,
            summary,
            saved_at: Utc::now(),
        }
    }
}
