//! Security module for DocChat: access gating and audit logging.
//!
//! Provides:
//! - **Access gate**: the single-credential check that grants administrator
//!   rights (context mutation notices, restored-context visibility)
//! - **Audit logging**: structured records of authorization and context events

pub mod audit;
pub mod gate;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use gate::AccessGate;
