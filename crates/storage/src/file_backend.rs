//! File-based key-value store: a single JSON object on disk.
//!
//! Each key maps to a string value. The whole map is loaded into memory on
//! open and flushed to disk on every mutation, so reads are cheap and writes
//! are durable.
//!
//! Storage location: `~/.docchat/storage.json` (configurable).

use async_trait::async_trait;
use docchat_core::error::StorageError;
use docchat_core::storage::{KeyValueStore, StoreOp};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed key-value store.
///
/// Writes go to a sibling temp file which is then renamed over the real one,
/// so a crash mid-write never leaves a half-written store behind.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty (created on first write). An unreadable
    /// or malformed file also starts empty; the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), keys = entries.len(), "File store loaded");
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(), // File does not exist yet, start empty
        };

        if content.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store file is not a string map, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// Write the full map to disk on the blocking pool.
    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &content))
            .await
            .map_err(|e| StorageError::Unavailable(format!("flush task failed: {e}")))?
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Write `content` to `path` via temp file + rename. Blocking.
fn write_atomically(path: &Path, content: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, content).map_err(|e| io_error(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_error(path, e))?;

    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn apply(&self, ops: Vec<StoreOp>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let before = entries.clone();

        for op in ops {
            match op {
                StoreOp::Set { key, value } => {
                    entries.insert(key, value);
                }
                StoreOp::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }

        if *entries == before {
            return Ok(());
        }

        if let Err(e) = self.flush(&entries).await {
            *entries = before;
            return Err(e);
        }

        Ok(())
    }
}
