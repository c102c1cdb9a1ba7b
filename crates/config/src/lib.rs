//! Configuration loading, validation, and management for PriceOwl.
//!
//! Loads configuration from `priceowl.toml` with environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
///
/// Maps directly to `priceowl.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Monitoring cycle settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Storefront region / localization settings
    #[serde(default)]
    pub region: RegionConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
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
            .field("provider", &self.provider)
            .field("gateway", &self.gateway)
            .field("monitor", &self.monitor)
            .field("region", &self.region)
            .field("http", &self.http)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the completion endpoint. Empty means "no AI" — the
    /// agent falls back to templated replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Tried once when the primary model errors.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Maximum generated tokens per chat reply.
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,
}

fn default_provider_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_fallback_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_max_reply_tokens() -> u32 {
    800
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_url(),
            model: default_model(),
            fallback_model: default_fallback_model(),
            max_reply_tokens: default_max_reply_tokens(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("max_reply_tokens", &self.max_reply_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between monitoring cycles. Kept wide — the primary
    /// storefront is unauthenticated and throttles tight loops.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Cap on the specials snapshot.
    #[serde(default = "default_specials_limit")]
    pub specials_limit: usize,

    /// Cap on the top-deals snapshot.
    #[serde(default = "default_top_deals_limit")]
    pub top_deals_limit: usize,

    /// Courtesy delay before each per-entry detail fetch.
    #[serde(default = "default_courtesy_delay_secs")]
    pub courtesy_delay_secs: u64,

    /// Default number of recent events returned by the API.
    #[serde(default = "default_events_limit")]
    pub events_limit: usize,
}

fn default_interval_secs() -> u64 {
    180
}
fn default_specials_limit() -> usize {
    15
}
fn default_top_deals_limit() -> usize {
    10
}
fn default_courtesy_delay_secs() -> u64 {
    1
}
fn default_events_limit() -> usize {
    20
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            specials_limit: default_specials_limit(),
            top_deals_limit: default_top_deals_limit(),
            courtesy_delay_secs: default_courtesy_delay_secs(),
            events_limit: default_events_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Country code sent to the primary storefront for regional prices.
    #[serde(default = "default_country")]
    pub country: String,

    /// Localization for titles and descriptions.
    #[serde(default = "default_language")]
    pub language: String,

    /// Currency code the storefront reports for this region.
    #[serde(default = "default_region_currency")]
    pub currency: String,
}

fn default_country() -> String {
    "RU".into()
}
fn default_language() -> String {
    "russian".into()
}
fn default_region_currency() -> String {
    "RUB".into()
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            language: default_language(),
            currency: default_region_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout for the primary storefront and comparison service.
    #[serde(default = "default_primary_timeout")]
    pub primary_timeout_secs: u64,

    /// Request timeout for the secondary storefronts.
    #[serde(default = "default_secondary_timeout")]
    pub secondary_timeout_secs: u64,

    /// Request timeout for the completion provider.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

fn default_primary_timeout() -> u64 {
    15
}
fn default_secondary_timeout() -> u64 {
    30
}
fn default_provider_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            primary_timeout_secs: default_primary_timeout(),
            secondary_timeout_secs: default_secondary_timeout(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, unparsable, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Build a default configuration with env overrides applied.
    /// Used when no config file exists — everything has a sane default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("PRICEOWL_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        // GROQ_API_KEY honored for compatibility with the provider's own docs
        if self.provider.api_key.is_none()
            && let Ok(key) = std::env::var("GROQ_API_KEY")
        {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("PRICEOWL_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.gateway.port = port;
        }
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port == 0 {
            return Err(ConfigError::Invalid("gateway.port must be non-zero".into()));
        }
        if self.monitor.interval_secs < 10 {
            return Err(ConfigError::Invalid(
                "monitor.interval_secs must be at least 10"
                    .into(),
            ));
        }
        for (name, value) in [
            ("monitor.specials_limit", self.monitor.specials_limit),
            ("monitor.top_deals_limit", self.monitor.top_deals_limit),
            ("monitor.events_limit", self.monitor.events_limit),
        ] {
            if value == 0 || value > 50 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 1..=50, got {value}"
                )));
            }
        }
        if self.http.primary_timeout_secs == 0
            || self.http.secondary_timeout_secs == 0
            || self.http.provider_timeout_secs == 0
        {
            return Err(ConfigError::Invalid("http timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monitor.interval_secs, 180);
        assert_eq!(config.monitor.specials_limit, 15);
        assert_eq!(config.monitor.top_deals_limit, 10);
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[gateway]\nport = 9000\n\n[monitor]\ninterval_secs = 60\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.monitor.interval_secs, 60);
        // Untouched sections keep defaults
        assert_eq!(config.monitor.specials_limit, 15);
        assert_eq!(config.region.country, "RU");
    }

    #[test]
    fn rejects_tight_monitor_interval() {
        let mut config = AppConfig::default();
        config.monitor.interval_secs = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_limits() {
        let mut config = AppConfig::default();
        config.monitor.specials_limit = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("gsk_secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
