//! `docchat status`: show configuration and stored context.

use docchat_config::AppConfig;
use docchat_storage::{ContextStore, FileStore};
use std::sync::Arc;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("📄 DocChat Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", docchat_providers::resolve_model(&config));
    println!("  Temperature:  {}", config.default_temperature);
    println!("  Max tokens:   {}", config.default_max_tokens);
    println!("  Timeout:      {}s", config.chat.request_timeout_secs);
    println!("  API key:      {}", yes_no(config.has_api_key()));
    println!("  Admin login:  {}", yes_no(config.access.admin_credential.is_some()));
    println!("  Store:        {}", config.storage_path().display());

    let store = ContextStore::new(Arc::new(FileStore::open(config.storage_path())));
    match store.load().await? {
        (Some(content), names) if !names.is_empty() => println!(
            "  Context:      {} document(s), {} bytes",
            names.len(),
            content.len()
        ),
        _ => println!("  Context:      none"),
    }

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `docchat onboard` first");
    }

    Ok(())
}
