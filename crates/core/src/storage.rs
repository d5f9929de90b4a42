//! Durable key-value storage trait.
//!
//! The engine persists its document context through this interface only.
//! Values are plain strings; callers encode structure themselves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A single mutation in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl StoreOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// The durable storage contract.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// A human-readable backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Read a value; `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply every operation or none of them.
    async fn apply(&self, ops: Vec<StoreOp>) -> Result<(), StorageError>;

    /// Write a single value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.apply(vec![StoreOp::set(key, value)]).await
    }

    /// Delete a single key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.apply(vec![StoreOp::remove(key)]).await
    }
}
