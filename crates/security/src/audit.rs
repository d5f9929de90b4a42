//! Audit logging: structured records of privileged events.
//!
//! Records authorization attempts and document context changes. Raw
//! credentials are never part of an entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub actor: String,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
}

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A credential was checked
    AuthAttempt,
    /// Administrator rights were dropped
    Deauthorized,
    /// A document context replaced the previous one
    ContextApplied { documents: usize },
    /// The document context was removed
    ContextCleared,
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Denied,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Entries kept in memory before the oldest are dropped.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// In-memory audit logger that forwards every entry to its sinks.
///
/// Only the most recent `max_entries` are retained in memory; sinks see
/// every entry.
pub struct AuditLogger {
    entries: Mutex<VecDeque<AuditEntry>>,
    max_entries: usize,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.count())
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
            sinks,
        }
    }

    /// Retain at most `max` entries in memory (at least one).
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    /// A logger that writes through `tracing`.
    pub fn tracing() -> Self {
        Self::with_sinks(vec![Box::new(TracingSink)])
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an audit event.
    pub fn log(&self, event: AuditEvent, actor: &str, outcome: AuditOutcome, details: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            actor: actor.into(),
            outcome,
            details,
        };

        {
            let mut entries = self.lock();
            while entries.len() >= self.max_entries {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// Get the retained entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Get entries with the given outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.lock()
            .iter()
            .filter(|e| &e.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

/// A tracing-based audit sink that logs entries via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            event = ?entry.event,
            actor = %entry.actor,
            outcome = ?entry.outcome,
            details = ?entry.details,
            "AUDIT"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct CountingSink(Arc<Mutex<usize>>);

    impl AuditSink for CountingSink {
        fn record(&self, _entry: &AuditEntry) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn log_and_retrieve_entries() {
        let logger = AuditLogger::new();
        logger.log(AuditEvent::AuthAttempt, "operator", AuditOutcome::Success, None);
        logger.log(
            AuditEvent::AuthAttempt,
            "operator",
            AuditOutcome::Denied,
            Some("credential mismatch".into()),
        );

        assert_eq!(logger.count(), 2);
        let denied = logger.entries_by_outcome(&AuditOutcome::Denied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].details.as_deref(), Some("credential mismatch"));
    }

    #[test]
    fn entries_are_forwarded_to_sinks() {
        let counter = Arc::new(Mutex::new(0));
        let logger = AuditLogger::with_sinks(vec![Box::new(CountingSink(counter.clone()))]);
        logger.log(AuditEvent::ContextCleared, "operator", AuditOutcome::Success, None);
        logger.log(
            AuditEvent::ContextApplied { documents: 2 },
            "operator",
            AuditOutcome::Success,
            None,
        );
        assert_eq!(*counter.lock().unwrap(), 2);
    }

    #[test]
    fn oldest_entries_are_dropped_past_the_cap() {
        let counter = Arc::new(Mutex::new(0));
        let logger = AuditLogger::with_sinks(vec![Box::new(CountingSink(counter.clone()))])
            .with_max_entries(3);
        for documents in 1..=5 {
            logger.log(
                AuditEvent::ContextApplied { documents },
                "user",
                AuditOutcome::Success,
                None,
            );
        }

        assert_eq!(logger.count(), 3);
        let kept: Vec<_> = logger.entries().into_iter().map(|e| e.event).collect();
        assert_eq!(
            kept,
            vec![
                AuditEvent::ContextApplied { documents: 3 },
                AuditEvent::ContextApplied { documents: 4 },
                AuditEvent::ContextApplied { documents: 5 },
            ]
        );
        assert_eq!(*counter.lock().unwrap(), 5);
    }

    #[test]
    fn default_cap_bounds_the_log() {
        let logger = AuditLogger::new();
        for _ in 0..DEFAULT_MAX_ENTRIES + 10 {
            logger.log(AuditEvent::AuthAttempt, "user", AuditOutcome::Denied, None);
        }
        assert_eq!(logger.count(), DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn audit_event_serialization_is_tagged() {
        let json = serde_json::to_string(&AuditEvent::ContextApplied { documents: 3 }).unwrap();
        assert!(json.contains(r#""type":"context_applied""#));
        assert!(json.contains("3"));
    }
}
