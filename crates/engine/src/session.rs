//! Session lifecycle: one stateful exchange with the remote model.
//!
//! A [`ChatSession`] keeps the model-side history of its own turns. The
//! [`SessionManager`] builds a fresh session plus its seeded transcript
//! whenever the engine asks for one.

use chrono::{DateTime, Utc};
use docchat_config::AppConfig;
use docchat_core::context::DocumentContext;
use docchat_core::error::{ProviderError, SessionError};
use docchat_core::message::{ConversationLog, Message, SessionId};
use docchat_core::provider::{PromptMessage, Provider, ProviderRequest, ProviderResponse};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::notices;
use crate::prompt;

/// Builds the provider for a new session.
pub type Connector = Arc<dyn Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// Request parameters shared by every turn of a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: docchat_providers::resolve_model(config),
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
            system_prompt: config.chat.system_prompt.clone(),
        }
    }
}

/// An opaque handle to one conversation with the remote model.
pub struct ChatSession {
    id: SessionId,
    created_at: DateTime<Utc>,
    provider: Arc<dyn Provider>,
    settings: SessionSettings,
    history: Mutex<Vec<PromptMessage>>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, settings: SessionSettings) -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            provider,
            settings,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Number of prompt messages exchanged so far (user and assistant).
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Send one user turn, augmented with `context` when present.
    ///
    /// The turn and its reply join the session history only on success, so
    /// a failed turn can simply be submitted again.
    pub async fn send(
        &self,
        input: &str,
        context: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        let turn = PromptMessage::user(prompt::augment(input, context));
        let mut history = self.history.lock().await;

        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.settings.system_prompt.trim().is_empty() {
            messages.push(PromptMessage::system(&self.settings.system_prompt));
        }
        messages.extend(history.iter().cloned());
        messages.push(turn.clone());

        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(
            session = %self.id,
            provider = self.provider.name(),
            history = history.len(),
            context = context.is_some(),
            "Sending turn"
        );

        let response = self.provider.complete(request).await?;

        history.push(turn);
        history.push(PromptMessage::assistant(&response.content));
        Ok(response)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("provider", &self.provider.name())
            .field("model", &self.settings.model)
            .finish()
    }
}

/// Creates sessions and seeds their transcripts.
pub struct SessionManager {
    connector: Connector,
    settings: SessionSettings,
    greeting: String,
}

impl SessionManager {
    pub fn new(connector: Connector, settings: SessionSettings, greeting: impl Into<String>) -> Self {
        Self {
            connector,
            settings,
            greeting: greeting.into(),
        }
    }

    /// A manager that connects to the configured provider.
    pub fn from_config(config: &AppConfig) -> Self {
        let owned = config.clone();
        let connector: Connector = Arc::new(move || docchat_providers::connect(&owned));
        Self::new(
            connector,
            SessionSettings::from_config(config),
            config.chat.greeting.clone(),
        )
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Create a new session and its seeded transcript.
    ///
    /// The log always starts with the greeting. A restoration notice naming
    /// the active documents follows only when `authorized` is true.
    pub fn initialize(
        &self,
        authorized: bool,
        context: Option<&DocumentContext>,
    ) -> Result<(Arc<ChatSession>, ConversationLog), SessionError> {
        let provider = (self.connector)().map_err(|e| {
            warn!(error = %e, "Session initialization failed");
            SessionError::Initialization {
                message: notices::session_failed(&e.to_string()),
            }
        })?;

        let session = Arc::new(ChatSession::new(provider, self.settings.clone()));

        let mut log = ConversationLog::new();
        log.push(Message::bot(&self.greeting));
        if authorized {
            if let Some(context) = context {
                log.push(Message::context_notice(notices::context_restored(
                    &context.names_joined(),
                )));
            }
        }

        info!(
            session = %session.id(),
            provider = session.provider_name(),
            model = session.model(),
            authorized,
            seeded = log.len(),
            "Chat session started"
        );
        Ok((session, log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, failing_connector, fixed_connector, settings};

    fn manager(provider: Arc<ScriptedProvider>) -> SessionManager {
        SessionManager::new(fixed_connector(provider), settings(), "Hi there")
    }

    fn context() -> DocumentContext {
        DocumentContext::new("doc text", vec!["a.pdf".into(), "b.txt".into()]).unwrap()
    }

    #[test]
    fn unauthorized_seed_is_greeting_only() {
        let m = manager(Arc::new(ScriptedProvider::replying("ok")));
        let (_, log) = m.initialize(false, Some(&context())).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].text, "Hi there");
        assert_eq!(log.notification_count(), 0);
    }

    #[test]
    fn authorized_seed_names_restored_documents() {
        let m = manager(Arc::new(ScriptedProvider::replying("ok")));
        let (_, log) = m.initialize(true, Some(&context())).unwrap();
        assert_eq!(log.len(), 2);
        let notice = &log.messages()[1];
        assert!(notice.is_context_notification);
        assert!(notice.text.contains("a.pdf, b.txt"));
    }

    #[test]
    fn authorized_without_context_is_greeting_only() {
        let m = manager(Arc::new(ScriptedProvider::replying("ok")));
        let (_, log) = m.initialize(true, None).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn each_initialization_yields_a_new_session() {
        let m = manager(Arc::new(ScriptedProvider::replying("ok")));
        let (a, _) = m.initialize(false, None).unwrap();
        let (b, _) = m.initialize(false, None).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn connector_failure_mentions_api_key() {
        let m = SessionManager::new(failing_connector(), settings(), "Hi");
        let err = m.initialize(false, None).err().unwrap();
        let text = err.to_string();
        assert!(text.contains("API key"));
        assert!(text.contains("no API key configured"));
    }

    #[tokio::test]
    async fn send_carries_system_prompt_history_and_context() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("first".into()), Ok("second".into())]));
        let session = ChatSession::new(provider.clone(), settings());

        session.send("one", None).await.unwrap();
        session.send("two", Some("doc text")).await.unwrap();
        assert_eq!(session.history_len().await, 4);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert_eq!(second.messages[0], PromptMessage::system("Be helpful."));
        assert_eq!(second.messages[1], PromptMessage::user("one"));
        assert_eq!(second.messages[2], PromptMessage::assistant("first"));
        let last = second.messages.last().unwrap();
        assert!(last.content.contains("doc text"));
        assert!(last.content.ends_with("Question: two"));
        assert_eq!(second.model, "test-model");
    }

    #[tokio::test]
    async fn failed_turn_is_not_added_to_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "connection reset".into(),
        ))]));
        let session = ChatSession::new(provider, settings());

        assert!(session.send("hi", None).await.is_err());
        assert_eq!(session.history_len().await, 0);
    }
}
