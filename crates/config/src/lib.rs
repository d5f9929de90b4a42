//! Configuration loading, validation, and management for DocChat.
//!
//! Loads configuration from `~/.docchat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.docchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Conversation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Administrator access settings
    #[serde(default)]
    pub access: AccessConfig,

    /// Durable storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("chat", &self.chat)
            .field("access", &self.access)
            .field("storage", &self.storage)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("admin_credential", &redact(&self.admin_credential))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// First message of every new session
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Instructions sent at the head of every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Upper bound on a single model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_greeting() -> String {
    "Hello! I'm your AI investment assistant. How can I help you get started with investing today?"
        .into()
}
fn default_system_prompt() -> String {
    concat!(
        "You are a friendly, knowledgeable investment advisor assistant. ",
        "Explain concepts clearly, keep answers practical, and remind the user ",
        "that your answers are educational and not personalised financial advice. ",
        "When reference documents are provided, ground your answer in them."
    )
    .into()
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// The single credential that unlocks administrator rights.
    /// Compared case-insensitively after trimming whitespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_credential: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the durable store file (default: `~/.docchat/storage.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.docchat/config.toml).
    ///
    /// Environment variables override file values, see
    /// [`AppConfig::apply_env_overrides`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// - API key (only if unset): `DOCCHAT_API_KEY`, `GEMINI_API_KEY`,
    ///   `OPENAI_API_KEY`, `OPENROUTER_API_KEY`, `ANTHROPIC_API_KEY`
    /// - `DOCCHAT_PROVIDER`, `DOCCHAT_MODEL`, `DOCCHAT_ADMIN_CREDENTIAL`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = [
                "DOCCHAT_API_KEY",
                "GEMINI_API_KEY",
                "OPENAI_API_KEY",
                "OPENROUTER_API_KEY",
                "ANTHROPIC_API_KEY",
            ]
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
        }

        if let Some(provider) = lookup("DOCCHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DOCCHAT_MODEL") {
            self.default_model = model;
        }

        if let Some(credential) = lookup("DOCCHAT_ADMIN_CREDENTIAL") {
            self.access.admin_credential = Some(credential);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docchat")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Resolve the durable store file path.
    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("storage.json"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.chat.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "chat.request_timeout_secs must be > 0".into(),
            ));
        }

        if let Some(credential) = &self.access.admin_credential {
            if credential.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "access.admin_credential must not be blank".into(),
                ));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            chat: ChatConfig::default(),
            access: AccessConfig::default(),
            storage: StorageConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
