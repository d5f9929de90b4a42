//! Shared test helpers for engine tests.

use async_trait::async_trait;
use docchat_config::AccessConfig;
use docchat_core::error::{ProviderError, StorageError};
use docchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use docchat_core::storage::{KeyValueStore, StoreOp};
use docchat_security::AccessGate;
use docchat_storage::{ContextStore, InMemoryStore};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

use crate::engine::ChatEngine;
use crate::session::{Connector, SessionManager, SessionSettings};

pub const CREDENTIAL: &str = "admin@x.com";
pub const GREETING: &str = "Hi there";

/// A provider that replays scripted results and records every request.
///
/// Once the script runs out it echoes the last user message.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Content of the final user message of the `index`-th request.
    pub fn sent_turn(&self, index: usize) -> String {
        let requests = self.requests.lock().unwrap();
        requests[index].messages.last().unwrap().content.clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let echo = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request);

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Ok(echo)).map(text_response)
    }
}

/// A provider that blocks every call until released.
pub struct GatedProvider {
    pub arrived: Notify,
    pub release: Notify,
    inner: ScriptedProvider,
}

impl GatedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            arrived: Notify::new(),
            release: Notify::new(),
            inner: ScriptedProvider::new(vec![Ok(text.to_string())]),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.inner.requests()
    }
}

#[async_trait]
impl Provider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.arrived.notify_one();
        self.release.notified().await;
        self.inner.complete(request).await
    }
}

/// A provider that never answers.
pub struct SilentProvider;

#[async_trait]
impl Provider for SilentProvider {
    fn name(&self) -> &str {
        "silent"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        std::future::pending().await
    }
}

/// A store whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn apply(&self, _ops: Vec<StoreOp>) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk full".into()))
    }
}

pub fn text_response(text: String) -> ProviderResponse {
    ProviderResponse {
        content: text,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "test-model".into(),
    }
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        model: "test-model".into(),
        temperature: 0.7,
        max_tokens: Some(256),
        system_prompt: "Be helpful.".into(),
    }
}

pub fn fixed_connector(provider: Arc<dyn Provider>) -> Connector {
    Arc::new(move || Ok(provider.clone()))
}

pub fn failing_connector() -> Connector {
    Arc::new(|| {
        Err(ProviderError::NotConfigured(
            "no API key configured for provider 'gemini'".into(),
        ))
    })
}

/// A connector that fails until `online` is set.
pub fn switchable_connector(provider: Arc<dyn Provider>, online: Arc<AtomicBool>) -> Connector {
    Arc::new(move || {
        if online.load(Ordering::SeqCst) {
            Ok(provider.clone())
        } else {
            Err(ProviderError::NotConfigured("no API key".into()))
        }
    })
}

pub fn gate() -> AccessGate {
    AccessGate::new(&AccessConfig {
        admin_credential: Some(CREDENTIAL.into()),
    })
}

pub fn engine_with(connector: Connector, backend: Arc<dyn KeyValueStore>) -> ChatEngine {
    ChatEngine::new(
        SessionManager::new(connector, settings(), GREETING),
        gate(),
        ContextStore::new(backend),
    )
}

/// A started engine over an empty in-memory store.
pub async fn started_engine(provider: Arc<dyn Provider>) -> ChatEngine {
    let engine = engine_with(fixed_connector(provider), Arc::new(InMemoryStore::new()));
    engine.start().await.unwrap();
    engine
}
