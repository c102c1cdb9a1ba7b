//! `priceowl serve` — Start the HTTP API server.
//!
//! Composition root: wires the storefront clients, the optional
//! completion provider, and the agent, then serves the router until
//! Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use priceowl_agent::DealAgent;
use priceowl_stores::{CheapSharkClient, GogClient, HumbleClient, SteamClient};
use tracing::info;

pub async fn run(
    config_path: Option<PathBuf>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path.as_ref())
        .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🦉 PriceOwl Gateway");
    println!(
        "   Listening: {}:{}",
        config.gateway.host, config.gateway.port
    );

    let primary = Arc::new(SteamClient::new(
        config.region.clone(),
        config.http.primary_timeout_secs,
    ));
    let comparison = Arc::new(CheapSharkClient::new(config.http.primary_timeout_secs));
    let curated = Arc::new(GogClient::new(config.http.secondary_timeout_secs));
    let bundles = Arc::new(HumbleClient::new(config.http.secondary_timeout_secs));
    let provider = priceowl_providers::build_provider(&config);

    println!(
        "   AI provider: {}",
        if provider.is_some() {
            "configured"
        } else {
            "not configured (templated replies)"
        }
    );

    let agent = Arc::new(DealAgent::new(
        primary,
        comparison,
        curated,
        bundles,
        provider,
        config.monitor.clone(),
        config.provider.max_reply_tokens,
    ));

    agent
        .start_monitoring(Duration::from_secs(config.monitor.interval_secs))
        .await;

    let app = priceowl_gateway::build_router(agent.clone());
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    info!(addr = %addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    agent.stop_monitoring().await;

    Ok(())
}
