//! PriceOwl CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP API server and the monitoring loop
//! - `config`  — Validate and summarize the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "priceowl",
    about = "PriceOwl — game deal monitoring agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Path to priceowl.toml (defaults + env vars when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate and print the effective configuration
    Config {
        /// Path to priceowl.toml (defaults + env vars when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { config, port } => commands::serve::run(config, port).await?,
        Commands::Config { config } => commands::config_cmd::run(config).await?,
    }

    Ok(())
}
