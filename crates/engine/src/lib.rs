//! The DocChat conversation engine.
//!
//! [`ChatEngine`] owns all mutable application state: the active session,
//! its transcript, the turn state machine, the access gate, and the shared
//! document context. Every mutation goes through its methods:
//!
//! - session lifecycle: [`ChatEngine::start`], [`ChatEngine::retry_session`],
//!   [`ChatEngine::shutdown`], and re-initialization on authorization change
//! - turns: [`ChatEngine::submit`]
//! - access: [`ChatEngine::authorize`], [`ChatEngine::deauthorize`]
//! - context: [`ChatEngine::apply_context`], [`ChatEngine::clear_context`]

pub mod conversation;
pub mod engine;
pub mod handlers;
pub mod notices;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use conversation::{IgnoreReason, TurnOutcome, TurnPhase};
pub use engine::ChatEngine;
pub use session::{ChatSession, Connector, SessionManager, SessionSettings};
