//! User-facing texts appended to the transcript or shown in the error banner.

/// Transcript entry when a turn is dropped before its reply arrived.
pub const TURN_CANCELLED: &str = "Sorry, the request was cancelled before a reply arrived.";

/// Error banner for a cancelled turn.
pub const TURN_CANCELLED_BANNER: &str = "Request cancelled before a reply arrived.";

/// Notice after the context is cleared.
pub const CONTEXT_CLEARED: &str = "The document context has been cleared from storage.";

/// Notice seeded into a new session when saved context is active.
pub fn context_restored(names: &str) -> String {
    format!("Using context from saved documents: {names}.")
}

/// Notice after a new context is applied.
pub fn context_applied(names: &str) -> String {
    format!(
        "Documents \"{names}\" have been uploaded and saved. \
         Their content will be used as context for your questions."
    )
}

/// Transcript entry for a failed turn.
pub fn turn_failed(reason: &str) -> String {
    format!("Sorry, I ran into an error: {reason}")
}

/// Error banner for a failed turn.
pub fn turn_failed_banner(reason: &str) -> String {
    format!("Could not get a response: {reason}")
}

/// Error banner when no session can be created.
pub fn session_failed(reason: &str) -> String {
    format!(
        "Could not start a chat session. Please make sure your API key is configured correctly. ({reason})"
    )
}
