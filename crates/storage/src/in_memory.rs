//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use docchat_core::error::StorageError;
use docchat_core::storage::{KeyValueStore, StoreOp};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A key-value store that lives only as long as the process.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, e.g. to simulate state left by a previous run.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn apply(&self, ops: Vec<StoreOp>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryStore::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn with_entries_prepopulates() {
        let store = InMemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
