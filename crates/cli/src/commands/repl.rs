//! Line parsing for the interactive chat.

use std::path::PathBuf;

pub const HELP: &str = "\
  /login <credential>   Log in as administrator
  /logout               Drop administrator rights
  /upload <file>...     Use text files as document context (administrator)
  /clear                Clear the document context (administrator)
  /context              Show the active documents (administrator)
  /retry                Start a fresh chat session
  /help                 Show this help
  /quit                 Exit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Login(String),
    Logout,
    Upload(Vec<PathBuf>),
    Clear,
    Context,
    Retry,
    Help,
    Quit,
    /// A chat turn
    Message(String),
    /// An unrecognized slash command, or one missing its argument
    Invalid(String),
}

impl ReplCommand {
    /// Whether the command needs administrator rights.
    ///
    /// The engine accepts context changes from anyone; the REPL only offers
    /// them to a logged-in administrator.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Clear | Self::Context)
    }

    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "login" if args.is_empty() => Self::Invalid("usage: /login <credential>".into()),
            "login" => Self::Login(args.to_string()),
            "logout" => Self::Logout,
            "upload" if args.is_empty() => Self::Invalid("usage: /upload <file>...".into()),
            "upload" => Self::Upload(args.split_whitespace().map(PathBuf::from).collect()),
            "clear" => Self::Clear,
            "context" => Self::Context,
            "retry" => Self::Retry,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command /{other}, try /help")),
        }
    }
}
