//! `priceowl config` — Validate and summarize the configuration.

use std::path::PathBuf;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match super::load_config(config_path.as_ref()) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.provider.api_key.is_none() {
                warnings.push(
                    "No API key set (set PRICEOWL_API_KEY or GROQ_API_KEY) — chat falls back to templated replies",
                );
            }
            if config.monitor.interval_secs < 60 {
                warnings.push("monitor.interval_secs below 60 may hit storefront rate limits");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Model:     {}", config.provider.model);
            println!("   Fallback:  {}", config.provider.fallback_model);
            println!(
                "   Gateway:   {}:{}",
                config.gateway.host, config.gateway.port
            );
            println!("   Interval:  {}s", config.monitor.interval_secs);
            println!(
                "   Region:    {} / {} / {}",
                config.region.country, config.region.language, config.region.currency
            );
            // Debug output redacts the API key
            println!();
            println!("   Effective: {config:#?}");
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
