//! File-backed session store.
//!
//! Layout: `<data_dir>/<database>/<collection>/<thread>.json`, one JSON
//! checkpoint per thread.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::config::Settings;
use crate::error::{PhiloError, Result};
use crate::types::ThreadId;

use super::{Checkpoint, SessionStore, StoreConnector, CHECKPOINT_VERSION};

/// Checkpoints stored as JSON files in one collection directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    collection_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>, database: &str, collection: &str) -> Self {
        Self {
            collection_dir: collection_dir(data_dir.as_ref(), database, collection),
        }
    }

    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    fn checkpoint_path(&self, thread_id: &ThreadId) -> PathBuf {
        self.collection_dir
            .join(format!("{}.json", normalize_label(thread_id.as_str())))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Checkpoint>> {
        let path = self.checkpoint_path(thread_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let checkpoint: Checkpoint = serde_json::from_str(&raw)?;
        if checkpoint.version > CHECKPOINT_VERSION {
            return Err(PhiloError::Store(format!(
                "{}: checkpoint version {} is newer than supported version {}",
                path.display(),
                checkpoint.version,
                CHECKPOINT_VERSION
            )));
        }
        Ok(Some(checkpoint))
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let path = self.checkpoint_path(&checkpoint.thread_id);
        fs::create_dir_all(&self.collection_dir).await?;

        let serialized = serde_json::to_vec_pretty(checkpoint)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serialized).await?;
        fs::rename(&tmp, &path).await?;
        debug!(thread_id = %checkpoint.thread_id, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<bool> {
        match fs::remove_file(self.checkpoint_path(thread_id)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Opens [`FileStore`] scopes on the checkpoint collection.
#[derive(Debug, Clone)]
pub struct FileConnector {
    data_dir: PathBuf,
    database: String,
    collection: String,
}

impl FileConnector {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Checkpoint collection named in settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.data_dir.clone(),
            settings.db_name.clone(),
            settings.checkpoint_collection.clone(),
        )
    }
}

#[async_trait]
impl StoreConnector for FileConnector {
    async fn connect(&self) -> Result<Box<dyn SessionStore>> {
        let store = FileStore::new(&self.data_dir, &self.database, &self.collection);
        fs::create_dir_all(store.collection_dir()).await.map_err(|e| {
            PhiloError::Store(format!(
                "cannot open {}: {e}",
                store.collection_dir().display()
            ))
        })?;
        debug!(dir = %store.collection_dir().display(), "session store opened");
        Ok(Box::new(store))
    }
}

/// Names of the collections in a database, as stored on disk.
pub async fn list_collections(data_dir: impl AsRef<Path>, database: &str) -> Result<Vec<String>> {
    let db_dir = data_dir.as_ref().join(normalize_label(database));
    let mut entries = match fs::read_dir(&db_dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Remove a whole collection. Returns whether it existed.
pub async fn drop_collection(
    data_dir: impl AsRef<Path>,
    database: &str,
    collection: &str,
) -> Result<bool> {
    let dir = collection_dir(data_dir.as_ref(), database, collection);
    match fs::remove_dir_all(&dir).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn collection_dir(data_dir: &Path, database: &str, collection: &str) -> PathBuf {
    data_dir
        .join(normalize_label(database))
        .join(normalize_label(collection))
}

/// Map an arbitrary key onto a file-safe name.
pub(crate) fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
