//! Message and conversation log domain types.
//!
//! A [`Message`] is what the user sees in the chat transcript: user input,
//! model replies, and informational notices about the document context.
//! The [`ConversationLog`] is the append-only transcript of one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message in the transcript.
///
/// Administrative and system notices are authored as [`Sender::Bot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The end user
    User,
    /// The assistant (model replies, errors, and notices)
    Bot,
}

/// A single transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Displayable content
    pub text: String,

    /// Who authored this message
    pub sender: Sender,

    /// Creation instant
    pub timestamp: DateTime<Utc>,

    /// Marks an informational context-lifecycle notice rather than a
    /// conversational turn
    #[serde(default)]
    pub is_context_notification: bool,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>, is_context_notification: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            is_context_notification,
        }
    }

    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text, false)
    }

    /// Create a new bot message (reply, greeting, or error).
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text, false)
    }

    /// Create a context-lifecycle notice (restored, applied, cleared).
    pub fn context_notice(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text, true)
    }
}

/// The ordered transcript of one session.
///
/// Append-only: there is no way to edit or remove a message once pushed.
/// A new session gets a new log rather than a mutated one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the log.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of context notices in the log.
    pub fn notification_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_context_notification)
            .count()
    }
}
