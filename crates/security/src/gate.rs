//! Access gate: binary administrator authorization.
//!
//! A candidate string is compared against one configured credential after
//! trimming whitespace and ignoring case. Authorization only decides which
//! context notices a user sees and who may be shown context provenance; it
//! protects no secret.

use docchat_config::AccessConfig;
use docchat_core::error::AccessError;
use std::sync::Arc;
use tracing::debug;

use crate::audit::{AuditEvent, AuditLogger, AuditOutcome};

const ACTOR: &str = "operator";

/// Authorization state plus the last login error.
#[derive(Debug)]
pub struct AccessGate {
    credential: Option<String>,
    authorized: bool,
    error: Option<AccessError>,
    audit: Arc<AuditLogger>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl AccessGate {
    /// Create an unauthorized gate for the configured credential.
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            credential: config
                .admin_credential
                .as_deref()
                .map(normalize)
                .filter(|c| !c.is_empty()),
            authorized: false,
            error: None,
            audit: Arc::new(AuditLogger::new()),
        }
    }

    /// Record attempts and revocations in `audit`.
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Check `candidate` against the configured credential.
    ///
    /// On a match the gate becomes authorized and any previous error is
    /// cleared. On a mismatch the authorization state is left as it was and
    /// a human-readable error is recorded.
    pub fn authorize(&mut self, candidate: &str) -> bool {
        let outcome = match &self.credential {
            None => Err(AccessError::NotConfigured),
            Some(expected) if *expected == normalize(candidate) => Ok(()),
            Some(_) => Err(AccessError::Mismatch),
        };

        match outcome {
            Ok(()) => {
                self.authorized = true;
                self.error = None;
                self.audit
                    .log(AuditEvent::AuthAttempt, ACTOR, AuditOutcome::Success, None);
                true
            }
            Err(e) => {
                debug!(error = %e, "Authorization rejected");
                self.audit.log(
                    AuditEvent::AuthAttempt,
                    ACTOR,
                    AuditOutcome::Denied,
                    Some(e.to_string()),
                );
                self.error = Some(e);
                false
            }
        }
    }

    /// Drop administrator rights and forget any login error.
    pub fn deauthorize(&mut self) {
        if self.authorized {
            self.audit
                .log(AuditEvent::Deauthorized, ACTOR, AuditOutcome::Success, None);
        }
        self.authorized = false;
        self.error = None;
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// The error from the last failed attempt, if any.
    pub fn error(&self) -> Option<&AccessError> {
        self.error.as_ref()
    }

    /// Whether any credential is configured at all.
    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }
}
