//! Subcommand implementations.

pub mod config_cmd;
pub mod serve;

use std::path::PathBuf;

use priceowl_config::{AppConfig, ConfigError};

/// Load the config file when given, otherwise defaults plus env vars.
pub fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load(path),
        None => AppConfig::from_env(),
    }
}
