//! The application-state object.
//!
//! All state lives in one [`EngineState`] behind a mutex that is never held
//! across an `.await`. Session re-initialization on an authorization change
//! happens synchronously inside [`ChatEngine::authorize`] and
//! [`ChatEngine::deauthorize`], so the transcript a caller reads right after
//! either call is already the new session's.

use chrono::Utc;
use docchat_config::AppConfig;
use docchat_core::context::DocumentContext;
use docchat_core::error::StorageError;
use docchat_core::event::{DomainEvent, EventBus};
use docchat_core::message::{ConversationLog, Message, SessionId};
use docchat_core::storage::KeyValueStore;
use docchat_security::{AccessGate, AuditLogger};
use docchat_storage::ContextStore;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::conversation::TurnPhase;
use crate::session::{ChatSession, SessionManager};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) struct EngineState {
    pub(crate) session: Option<Arc<ChatSession>>,
    pub(crate) log: ConversationLog,
    pub(crate) phase: TurnPhase,
    pub(crate) error: Option<String>,
    pub(crate) gate: AccessGate,
    pub(crate) context: Option<DocumentContext>,
}

/// Owns the session, transcript, turn state, access gate, and document
/// context of one client run.
pub struct ChatEngine {
    pub(crate) sessions: SessionManager,
    pub(crate) store: ContextStore,
    pub(crate) events: Arc<EventBus>,
    pub(crate) audit: Arc<AuditLogger>,
    pub(crate) request_timeout: Duration,
    pub(crate) state: Mutex<EngineState>,
    /// Held across persist and in-memory update so the store and memory
    /// always end on the same context.
    pub(crate) context_writes: tokio::sync::Mutex<()>,
}

impl ChatEngine {
    /// Create an engine with no session yet. Call [`ChatEngine::start`].
    pub fn new(sessions: SessionManager, gate: AccessGate, store: ContextStore) -> Self {
        let audit = gate.audit().clone();
        Self {
            sessions,
            store,
            events: Arc::new(EventBus::default()),
            audit,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: Mutex::new(EngineState {
                session: None,
                log: ConversationLog::new(),
                phase: TurnPhase::Idle,
                error: None,
                gate,
                context: None,
            }),
            context_writes: tokio::sync::Mutex::new(()),
        }
    }

    /// Build an engine from configuration over the given durable store.
    pub fn from_config(config: &AppConfig, backend: Arc<dyn KeyValueStore>) -> Self {
        let gate = AccessGate::new(&config.access).with_audit(Arc::new(AuditLogger::tracing()));
        Self::new(
            SessionManager::from_config(config),
            gate,
            ContextStore::new(backend),
        )
        .with_request_timeout(Duration::from_secs(config.chat.request_timeout_secs))
    }

    /// Publish domain events on `events` instead of a private bus.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    /// Upper bound on a single model call.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Restore the persisted context and open the first (unauthorized)
    /// session.
    ///
    /// A failure to create the session is not an error here: it shows up in
    /// [`ChatEngine::error`] and can be retried with
    /// [`ChatEngine::retry_session`].
    pub async fn start(&self) -> Result<(), StorageError> {
        let (content, names) = self.store.load().await?;
        let had_content = content.is_some();
        let context = DocumentContext::from_parts(content, names);
        if had_content && context.is_none() {
            warn!("Stored document context is incomplete, ignoring it");
        }
        if let Some(context) = &context {
            info!(documents = context.names().len(), "Restored document context");
        }

        let mut state = self.lock();
        state.context = context;
        self.open_session(&mut state);
        Ok(())
    }

    /// Replace the active session with a fresh one and reset the transcript.
    ///
    /// On failure the session is dropped, the transcript is left alone, and
    /// the error banner describes what went wrong.
    fn open_session(&self, state: &mut EngineState) {
        let authorized = state.gate.is_authorized();
        match self.sessions.initialize(authorized, state.context.as_ref()) {
            Ok((session, log)) => {
                self.events.publish(DomainEvent::SessionStarted {
                    session_id: session.id().to_string(),
                    seeded_messages: log.len(),
                    timestamp: Utc::now(),
                });
                state.session = Some(session);
                state.log = log;
                state.error = None;
            }
            Err(e) => {
                let message = e.to_string();
                self.events.publish(DomainEvent::SessionFailed {
                    error_message: message.clone(),
                    timestamp: Utc::now(),
                });
                state.session = None;
                state.error = Some(message);
            }
        }
    }

    /// Start a fresh session, e.g. after initialization failed.
    ///
    /// Returns whether a session is active afterwards.
    pub fn retry_session(&self) -> bool {
        let mut state = self.lock();
        self.open_session(&mut state);
        state.session.is_some()
    }

    /// Release the session handle. The document context stays persisted.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if let Some(session) = state.session.take() {
            debug!(session = %session.id(), "Session released");
        }
    }

    /// Check a credential. A change of authorization starts a new session.
    pub fn authorize(&self, candidate: &str) -> bool {
        let mut state = self.lock();
        let before = state.gate.is_authorized();
        let matched = state.gate.authorize(candidate);
        if state.gate.is_authorized() != before {
            self.authorization_changed(&mut state);
        }
        matched
    }

    /// Drop administrator rights. A change of authorization starts a new
    /// session.
    pub fn deauthorize(&self) {
        let mut state = self.lock();
        let before = state.gate.is_authorized();
        state.gate.deauthorize();
        if before {
            self.authorization_changed(&mut state);
        }
    }

    // Every transition gets a new session even when nothing about the
    // context changed; the old conversation memory is not carried over.
    fn authorization_changed(&self, state: &mut EngineState) {
        let authorized = state.gate.is_authorized();
        info!(authorized, "Authorization changed");
        self.events.publish(DomainEvent::AuthorizationChanged {
            authorized,
            timestamp: Utc::now(),
        });
        self.open_session(state);
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().log.messages().to_vec()
    }

    pub fn phase(&self) -> TurnPhase {
        self.lock().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == TurnPhase::Sending
    }

    /// The visible error banner: a failed session start or the last failed
    /// turn.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// The login error, shown next to the login prompt only.
    pub fn auth_error(&self) -> Option<String> {
        self.lock().gate.error().map(|e| e.to_string())
    }

    pub fn is_authorized(&self) -> bool {
        self.lock().gate.is_authorized()
    }

    pub fn document_context(&self) -> Option<DocumentContext> {
        self.lock().context.clone()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().session.as_ref().map(|s| s.id().clone())
    }

    pub fn has_session(&self) -> bool {
        self.lock().session.is_some()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }
}
