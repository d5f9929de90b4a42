//! Provider selection: builds the configured LLM provider.
//!
//! Construction fails with [`ProviderError::NotConfigured`] when the provider
//! needs an API key and none is available; that failure is what the session
//! manager reports as a session initialization error.

use docchat_config::AppConfig;
use docchat_core::error::ProviderError;
use docchat_core::provider::Provider;
use std::sync::Arc;
use tracing::debug;

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the default provider from configuration.
pub fn connect(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    let api_url = provider_config.and_then(|p| p.api_url.clone());

    let api_key = match api_key {
        Some(key) => key,
        None if !requires_api_key(name) => String::new(),
        None => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key configured for provider '{name}'"
            )));
        }
    };

    debug!(provider = name, custom_url = api_url.is_some(), "Connecting provider");

    let provider: Arc<dyn Provider> = if name == "anthropic" {
        let mut p = AnthropicProvider::new(api_key);
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        Arc::new(p)
    } else {
        let base_url = match api_url {
            Some(url) => url,
            None => default_base_url(name).ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "unknown provider '{name}': set providers.{name}.api_url"
                ))
            })?,
        };
        Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
    };

    Ok(provider)
}

/// The model to request from the default provider.
pub fn resolve_model(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Local runtimes accept requests without a key.
fn requires_api_key(provider_name: &str) -> bool {
    !matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "anthropic" => "https://api.anthropic.com",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_config::ProviderConfig;

    #[test]
    fn missing_api_key_is_not_configured() {
        let config = AppConfig::default();
        let err = connect(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn global_api_key_connects_default_provider() {
        let config = AppConfig {
            api_key: Some("gm-test".into()),
            ..AppConfig::default()
        };
        let provider = connect(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = AppConfig {
            api_key: Some("   ".into()),
            ..AppConfig::default()
        };
        assert!(connect(&config).is_err());
    }

    #[test]
    fn local_provider_needs_no_key() {
        let config = AppConfig {
            default_provider: "ollama".into(),
            ..AppConfig::default()
        };
        assert_eq!(connect(&config).unwrap().name(), "ollama");
    }

    #[test]
    fn anthropic_uses_native_provider() {
        let config = AppConfig {
            default_provider: "anthropic".into(),
            api_key: Some("sk-ant".into()),
            ..AppConfig::default()
        };
        assert_eq!(connect(&config).unwrap().name(), "anthropic");
    }

    #[test]
    fn unknown_provider_without_url_fails() {
        let config = AppConfig {
            default_provider: "mystery".into(),
            api_key: Some("k".into()),
            ..AppConfig::default()
        };
        assert!(connect(&config).is_err());
    }

    #[test]
    fn per_provider_settings_win() {
        let mut config = AppConfig {
            default_provider: "mystery".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "mystery".into(),
            ProviderConfig {
                api_key: Some("k".into()),
                api_url: Some("http://mystery.local/v1".into()),
                default_model: Some("mystery-1".into()),
            },
        );
        assert_eq!(connect(&config).unwrap().name(), "mystery");
        assert_eq!(resolve_model(&config), "mystery-1");
    }

    #[test]
    fn well_known_urls() {
        assert!(default_base_url("gemini").unwrap().contains("googleapis"));
        assert!(default_base_url("nope").is_none());
    }
}
