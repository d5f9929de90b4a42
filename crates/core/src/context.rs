//! Document context: the shared reference material injected into turns.
//!
//! A context is a text blob plus the ordered labels of the sources it was
//! built from. The two halves exist together or not at all: an engine holds
//! `Option<DocumentContext>`, never a context with content but no names.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Separator used when listing document names in notices.
pub const NAME_SEPARATOR: &str = ", ";

/// An active document context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContext {
    content: String,
    names: Vec<String>,
}

impl DocumentContext {
    /// Build a context, rejecting empty content or an empty name list.
    pub fn new(content: impl Into<String>, names: Vec<String>) -> Result<Self, Error> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::InvalidContext("content must not be empty".into()));
        }
        if names.is_empty() {
            return Err(Error::InvalidContext(
                "at least one document name is required".into(),
            ));
        }
        Ok(Self { content, names })
    }

    /// Reassemble a context from its stored halves.
    ///
    /// Returns `None` unless both halves are present and usable.
    pub fn from_parts(content: Option<String>, names: Vec<String>) -> Option<Self> {
        Self::new(content?, names).ok()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Document names joined for display.
    pub fn names_joined(&self) -> String {
        self.names.join(NAME_SEPARATOR)
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.content, self.names)
    }
}
