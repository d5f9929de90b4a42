//! Domain event system: decoupled notification of engine state changes.
//!
//! Events are published when the session, the transcript, the document
//! context, or the authorization state changes. A UI subscribes and
//! re-renders; nothing in the engine depends on anyone listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A new session was created and its log seeded
    SessionStarted {
        session_id: String,
        seeded_messages: usize,
        timestamp: DateTime<Utc>,
    },

    /// Session creation failed; no turns can be sent
    SessionFailed {
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A turn resolved with a model reply
    TurnCompleted {
        session_id: String,
        context_injected: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A turn resolved with an error
    TurnFailed {
        session_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A document context was applied and persisted
    ContextApplied {
        document_count: usize,
        content_bytes: usize,
        timestamp: DateTime<Utc>,
    },

    /// The document context was cleared
    ContextCleared { timestamp: DateTime<Utc> },

    /// Authorization state flipped
    AuthorizationChanged {
        authorized: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
