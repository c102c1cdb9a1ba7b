//! Watchlist entry types — the one piece of real state the agent owns.

use crate::catalog::GameDetail;
use serde::{Deserialize, Serialize};

/// Which storefront a watchlist entry belongs to.
///
/// Only `Steam` entries get their prices refreshed by the monitoring cycle;
/// the others are carried through the watchlist unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storefront {
    #[default]
    Steam,
    Epic,
    Gog,
    Other,
}

impl std::fmt::Display for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Storefront::Steam => "steam",
            Storefront::Epic => "epic",
            Storefront::Gog => "gog",
            Storefront::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// One game the user tracks for price changes.
///
/// Prices here are always in **major** currency units (e.g. rubles, not
/// kopecks); the monitoring cycle converts storefront minor-unit prices
/// before writing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Stable internal identifier, unique within the watchlist.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Source storefront for price refreshes.
    #[serde(default)]
    pub source: Storefront,

    /// Identifier in the storefront's own catalog (Steam AppID etc.).
    #[serde(default)]
    pub external_id: Option<String>,

    /// Last known price, `None` until the first refresh.
    #[serde(default)]
    pub current_price: Option<f64>,

    /// List price without discount, when known.
    #[serde(default)]
    pub original_price: Option<f64>,

    /// Currency code for the prices above.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Current discount in percent, when known.
    #[serde(default)]
    pub discount_percent: Option<f64>,

    /// Whether the game is actively monitored.
    #[serde(default = "default_true")]
    pub is_tracked: bool,

    /// Cached last full detail payload, used to enrich chat context.
    /// Not part of the watchlist contract; refreshed opportunistically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<GameDetail>,
}

fn default_currency() -> String {
    "RUB".into()
}

fn default_true() -> bool {
    true
}

impl Game {
    /// Create a minimal tracked entry; the rest fills in on first refresh.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: Storefront::default(),
            external_id: None,
            current_price: None,
            original_price: None,
            currency: default_currency(),
            discount_percent: None,
            is_tracked: true,
            detail: None,
        }
    }

    /// Builder-style external id setter.
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Builder-style source setter.
    pub fn with_source(mut self, source: Storefront) -> Self {
        self.source = source;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_deserialize() {
        let game: Game = serde_json::from_str(r#"{"id":"g1","title":"Portal"}"#).unwrap();
        assert_eq!(game.source, Storefront::Steam);
        assert_eq!(game.currency, "RUB");
        assert!(game.is_tracked);
        assert!(game.current_price.is_none());
    }

    #[test]
    fn detail_cache_not_serialized_when_absent() {
        let game = Game::new("g1", "Portal");
        let json = serde_json::to_string(&game).unwrap();
        assert!(!json.contains("detail"));
    }

    #[test]
    fn storefront_display() {
        assert_eq!(Storefront::Steam.to_string(), "steam");
        assert_eq!(Storefront::Gog.to_string(), "gog");
    }
}
