//! `docchat doctor`: diagnose system health.

use docchat_config::AppConfig;
use docchat_storage::{ContextStore, FileStore};
use std::sync::Arc;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 DocChat Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `docchat onboard` (defaults in use)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    match docchat_providers::connect(&config) {
        Ok(provider) => {
            println!("  ✅ Provider '{}' configured", provider.name());
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ⚠️  Provider rejected the health check — check the API key");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ⚠️  Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e} — set GEMINI_API_KEY or api_key in config.toml");
            issues += 1;
        }
    }

    if config.access.admin_credential.is_some() {
        println!("  ✅ Administrator credential configured");
    } else {
        println!("  ⚠️  No administrator credential — /login is disabled");
    }

    let store_path = config.storage_path();
    if store_path.is_dir() {
        println!("  ❌ Store path is a directory: {}", store_path.display());
        issues += 1;
    } else if store_path.exists() {
        let store = ContextStore::new(Arc::new(FileStore::open(&store_path)));
        let (_, names) = store.load().await?;
        println!(
            "  ✅ Store found: {} ({} stored document(s))",
            store_path.display(),
            names.len()
        );
    } else {
        println!("  ✅ Store will be created at: {}", store_path.display());
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
