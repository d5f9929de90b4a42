//! Error types for the DocChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all DocChat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Access errors ---
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    // --- Caller contract ---
    #[error("Invalid document context: {0}")]
    InvalidContext(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the remote model transport. A single failed turn is
/// recoverable: the session stays usable.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Failures of the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O failure on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to encode stored value: {0}")]
    Encode(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A session could not be created. Fatal to the current attempt only.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{message}")]
    Initialization { message: String },
}

/// Authorization failures, scoped to the login affordance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Incorrect credential. Please try again.")]
    Mismatch,

    #[error("No administrator credential is configured.")]
    NotConfigured,
}
