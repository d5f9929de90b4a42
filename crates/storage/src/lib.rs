//! Durable storage implementations for DocChat.
//!
//! - [`FileStore`]: a JSON file on disk, survives restarts
//! - [`InMemoryStore`]: ephemeral, for tests and throwaway runs
//! - [`ContextStore`]: the document context persisted under two fixed keys

pub mod context_store;
pub mod file_backend;
pub mod in_memory;

pub use context_store::{ContextStore, CONTENT_KEY, NAMES_KEY};
pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
