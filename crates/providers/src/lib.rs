//! Completion provider implementations for PriceOwl.
//!
//! Currently ships a single Groq-backed provider speaking the
//! OpenAI-compatible chat completions protocol. The agent treats the
//! provider as optional: when no API key is configured the composer
//! falls back to templated replies built from live market data.

pub mod groq;

pub use groq::GroqProvider;

use std::sync::Arc;

use priceowl_config::AppConfig;
use priceowl_core::provider::CompletionProvider;
use tracing::info;

/// Build the completion provider described by the config.
///
/// Returns `None` when no API key is configured (blank counts as
/// missing), which puts the composer into fallback-only mode.
pub fn build_provider(config: &AppConfig) -> Option<Arc<dyn CompletionProvider>> {
    let api_key = config
        .provider
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())?;

    info!(model = %config.provider.model, "AI provider configured");
    Some(Arc::new(GroqProvider::new(
        &config.provider.base_url,
        api_key,
        &config.provider.model,
        &config.provider.fallback_model,
        config.http.provider_timeout_secs,
    )))
}
