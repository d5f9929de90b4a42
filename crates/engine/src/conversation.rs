//! The turn-taking protocol.
//!
//! `Idle -> Sending -> Idle`, with exactly one turn in flight. The user
//! message is appended before the model is called; the reply or the error
//! is appended when the call resolves. A dropped or timed-out call still
//! returns the engine to `Idle`.

use chrono::Utc;
use docchat_core::error::ProviderError;
use docchat_core::event::DomainEvent;
use docchat_core::message::Message;
use docchat_core::provider::ProviderResponse;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::engine::ChatEngine;
use crate::notices;
use crate::session::ChatSession;

/// Turn state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Sending,
}

/// Why a submission was not turned into a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Empty or whitespace-only input
    EmptyInput,
    /// No session is active
    NoSession,
    /// Another turn is still in flight
    Busy,
}

/// How a call to [`ChatEngine::submit`] resolved.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Nothing was appended.
    Ignored(IgnoreReason),
    /// The model reply that was appended.
    Replied(Message),
    /// The error entry that was appended; `error` is also the banner text.
    Failed { message: Message, error: String },
    /// The session was replaced while the call was in flight; the late
    /// result was dropped.
    Discarded,
}

/// Resets the engine if a turn future is dropped mid-flight.
struct TurnGuard<'a> {
    engine: &'a ChatEngine,
    session: Arc<ChatSession>,
    armed: bool,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(session = %self.session.id(), "Turn cancelled before a reply arrived");

        let mut state = self.engine.lock();
        state.phase = TurnPhase::Idle;
        if !is_current(state.session.as_ref(), &self.session) {
            return;
        }
        state.log.push(Message::bot(notices::TURN_CANCELLED));
        state.error = Some(notices::TURN_CANCELLED_BANNER.to_string());
        self.engine.events.publish(DomainEvent::TurnFailed {
            session_id: self.session.id().to_string(),
            error_message: notices::TURN_CANCELLED_BANNER.to_string(),
            timestamp: Utc::now(),
        });
    }
}

fn is_current(active: Option<&Arc<ChatSession>>, session: &Arc<ChatSession>) -> bool {
    active.is_some_and(|a| Arc::ptr_eq(a, session))
}

impl ChatEngine {
    /// Run one turn.
    ///
    /// The context is captured when the turn starts; applying or clearing
    /// it while the call is in flight does not change what was sent.
    pub async fn submit(&self, input: &str) -> TurnOutcome {
        if input.trim().is_empty() {
            return TurnOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let (session, context) = {
            let mut state = self.lock();
            let Some(session) = state.session.clone() else {
                return TurnOutcome::Ignored(IgnoreReason::NoSession);
            };
            if state.phase == TurnPhase::Sending {
                return TurnOutcome::Ignored(IgnoreReason::Busy);
            }
            state.log.push(Message::user(input));
            state.phase = TurnPhase::Sending;
            state.error = None;
            let context = state.context.as_ref().map(|c| c.content().to_string());
            (session, context)
        };

        let mut guard = TurnGuard {
            engine: self,
            session: session.clone(),
            armed: true,
        };

        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.request_timeout,
            session.send(input, context.as_deref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.request_timeout.as_secs())),
        };
        guard.armed = false;

        self.finish_turn(&session, result, context.is_some(), started.elapsed())
    }

    fn finish_turn(
        &self,
        session: &Arc<ChatSession>,
        result: Result<ProviderResponse, ProviderError>,
        context_injected: bool,
        elapsed: Duration,
    ) -> TurnOutcome {
        let mut state = self.lock();
        state.phase = TurnPhase::Idle;

        if !is_current(state.session.as_ref(), session) {
            debug!(session = %session.id(), "Dropping reply from a replaced session");
            return TurnOutcome::Discarded;
        }

        match result {
            Ok(response) => {
                let message = Message::bot(response.content);
                state.log.push(message.clone());
                info!(
                    session = %session.id(),
                    context = context_injected,
                    duration_ms = elapsed.as_millis() as u64,
                    "Turn completed"
                );
                self.events.publish(DomainEvent::TurnCompleted {
                    session_id: session.id().to_string(),
                    context_injected,
                    duration_ms: elapsed.as_millis() as u64,
                    timestamp: Utc::now(),
                });
                TurnOutcome::Replied(message)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(session = %session.id(), error = %reason, "Turn failed");
                let message = Message::bot(notices::turn_failed(&reason));
                let error = notices::turn_failed_banner(&reason);
                state.log.push(message.clone());
                state.error = Some(error.clone());
                self.events.publish(DomainEvent::TurnFailed {
                    session_id: session.id().to_string(),
                    error_message: reason,
                    timestamp: Utc::now(),
                });
                TurnOutcome::Failed { message, error }
            }
        }
    }
}
