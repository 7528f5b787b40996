//! In-process session store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::ThreadId;

use super::{Checkpoint, SessionStore, StoreConnector};

type Threads = Arc<RwLock<HashMap<ThreadId, Checkpoint>>>;

/// Checkpoints held in a shared map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    threads: Threads,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads stored.
    pub async fn len(&self) -> usize {
        self.threads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.threads.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Checkpoint>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.threads
            .write()
            .await
            .insert(checkpoint.thread_id.clone(), checkpoint.clone());
        Ok(())
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<bool> {
        Ok(self.threads.write().await.remove(thread_id).is_some())
    }
}

/// Hands out scopes over one shared [`InMemoryStore`] and counts how many
/// are open.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    store: InMemoryStore,
    open: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        Self {
            store,
            open: Arc::default(),
        }
    }

    /// The store behind every scope.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Scopes connected and not yet dropped.
    pub fn open_scopes(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Box<dyn SessionStore>> {
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryScope {
            store: self.store.clone(),
            open: self.open.clone(),
        }))
    }
}

struct InMemoryScope {
    store: InMemoryStore,
    open: Arc<AtomicUsize>,
}

impl Drop for InMemoryScope {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for InMemoryScope {
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Checkpoint>> {
        self.store.load(thread_id).await
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.store.save(checkpoint).await
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<bool> {
        self.store.delete(thread_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Turn;

    #[tokio::test]
    async fn save_load_delete() {
        let store = InMemoryStore::new();
        let thread = ThreadId::new("socrates");
        assert!(store.load(&thread).await.unwrap().is_none());

        let checkpoint = Checkpoint::new(thread.clone(), vec![Turn::user("hi")], "s".into());
        store.save(&checkpoint).await.unwrap();
        assert_eq!(store.load(&thread).await.unwrap(), Some(checkpoint));

        assert!(store.delete(&thread).await.unwrap());
        assert!(!store.delete(&thread).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let store = InMemoryStore::new();
        let thread = ThreadId::new("t");
        store
            .save(&Checkpoint::new(thread.clone(), vec![], "first".into()))
            .await
            .unwrap();
        store
            .save(&Checkpoint::new(thread.clone(), vec![], "second".into()))
            .await
            .unwrap();
        let loaded = store.load(&thread).await.unwrap().unwrap();
        assert_eq!(loaded.summary, "second");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn scopes_are_counted_until_dropped() {
        let connector = InMemoryConnector::new();
        let a = connector.connect().await.unwrap();
        let b = connector.connect().await.unwrap();
        assert_eq!(connector.open_scopes(), 2);
        drop(a);
        assert_eq!(connector.open_scopes(), 1);

        b.save(&Checkpoint::new(ThreadId::new("t"), vec![], String::new()))
            .await
            .unwrap();
        drop(b);
        assert_eq!(connector.open_scopes(), 0);
        assert_eq!(connector.store().len().await, 1);
    }
}
