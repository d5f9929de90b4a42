//! `docchat context`: inspect or clear the stored document context.

use docchat_config::AppConfig;
use docchat_storage::{ContextStore, FileStore};
use std::sync::Arc;

fn open_store(config: &AppConfig) -> ContextStore {
    ContextStore::new(Arc::new(FileStore::open(config.storage_path())))
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let (content, names) = open_store(&config).load().await?;

    println!("📄 Stored Document Context");
    println!("==========================");
    println!("  Store:      {}", config.storage_path().display());
    match content {
        Some(content) if !names.is_empty() => {
            println!("  Documents:  {}", names.join(", "));
            println!("  Size:       {} bytes", content.len());
        }
        Some(_) => println!("  Documents:  (names missing, context will be ignored)"),
        None => println!("  Documents:  (none)"),
    }

    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    open_store(&config).clear().await?;
    println!("✅ Document context cleared from {}", config.storage_path().display());
    Ok(())
}
