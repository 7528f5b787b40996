//! Session store: checkpoints of conversation state, keyed by thread id.
//!
//! A [`StoreConnector`] opens one [`SessionStore`] scope per call. Dropping
//! the scope releases it.

pub mod checkpoint;
pub mod file;
pub mod memory;

pub use checkpoint::{Checkpoint, CHECKPOINT_VERSION};
pub use file::{drop_collection, list_collections, FileConnector, FileStore};
pub(crate) use file::normalize_label;
pub use memory::{InMemoryConnector, InMemoryStore};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ThreadId;

/// Storage for conversation checkpoints.
///
/// Writes are last-writer-wins; there is no conflict detection between
/// concurrent runs on the same thread.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the latest checkpoint of a thread, `None` if the thread is unknown.
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Checkpoint>>;
    /// Replace the checkpoint of `checkpoint.thread_id`.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<()>;
    /// Forget a thread. Returns whether it existed.
    async fn delete(&self, thread_id: &ThreadId) -> Result<bool>;
}

/// Opens session store scopes.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SessionStore>>;
}
