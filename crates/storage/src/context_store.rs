//! Persistent document context store.
//!
//! The context lives under two fixed keys: the raw content text and a JSON
//! array of document names. Nothing else in the backing store is touched.

use docchat_core::error::StorageError;
use docchat_core::storage::{KeyValueStore, StoreOp};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the context content as plain text.
pub const CONTENT_KEY: &str = "docchat.documentContext";

/// Key holding the document names as a JSON array of strings.
pub const NAMES_KEY: &str = "docchat.documentNames";

/// Reads and writes the document context through a [`KeyValueStore`].
#[derive(Clone)]
pub struct ContextStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ContextStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist content and names together.
    ///
    /// Both keys are written in one atomic batch; a backend failure is
    /// returned and neither key changes.
    pub async fn save(&self, content: &str, names: &[String]) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(names).map_err(|e| StorageError::Encode(e.to_string()))?;

        self.backend
            .apply(vec![
                StoreOp::set(CONTENT_KEY, content),
                StoreOp::set(NAMES_KEY, encoded),
            ])
            .await?;

        debug!(
            backend = self.backend.name(),
            documents = names.len(),
            content_bytes = content.len(),
            "Document context saved"
        );
        Ok(())
    }

    /// Read content and names.
    ///
    /// A names value that is not a JSON array of strings is deleted and read
    /// as an empty list; corruption means "no names", never an error.
    pub async fn load(&self) -> Result<(Option<String>, Vec<String>), StorageError> {
        let content = self.backend.get(CONTENT_KEY).await?;

        let names = match self.backend.get(NAMES_KEY).await? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(names) => names,
                Err(e) => {
                    warn!(error = %e, "Discarding corrupted document names");
                    if let Err(e) = self.backend.remove(NAMES_KEY).await {
                        warn!(error = %e, "Failed to delete corrupted document names");
                    }
                    Vec::new()
                }
            },
        };

        Ok((content, names))
    }

    /// Delete both keys. Clearing an empty store is a no-op.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.backend
            .apply(vec![StoreOp::remove(CONTENT_KEY), StoreOp::remove(NAMES_KEY)])
            .await?;
        debug!(backend = self.backend.name(), "Document context cleared");
        Ok(())
    }
}
