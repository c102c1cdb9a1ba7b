//! Trend events — facts the monitoring cycle decided are noteworthy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a trend event.
///
/// Only `PriceDrop` is produced by the current monitoring cycle; the other
/// kinds are part of the wire contract for future derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendEventKind {
    PriceDrop,
    DiscountStarted,
    DiscountEnded,
    NewDlc,
    PopularityChange,
    News,
}

/// An append-only event derived from fresh market data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendEvent {
    /// Unique event identifier, collision-free for the process lifetime.
    pub id: String,

    /// The watchlist entry this event concerns, if any.
    #[serde(default)]
    pub game_id: Option<String>,

    /// Event kind tag.
    #[serde(rename = "type")]
    pub kind: TrendEventKind,

    /// Human-readable headline.
    pub title: String,

    /// Human-readable details (e.g. before/after prices).
    pub description: String,
}

impl TrendEvent {
    /// Create a price-drop event for a watchlist entry.
    pub fn price_drop(
        game_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("event_{}", Uuid::new_v4().simple()),
            game_id: Some(game_id.into()),
            kind: TrendEventKind::PriceDrop,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_drop_has_unique_ids() {
        let a = TrendEvent::price_drop("g1", "t", "d");
        let b = TrendEvent::price_drop("g1", "t", "d");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("event_"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let event = TrendEvent::price_drop("g1", "t", "d");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"price_drop\""));
    }
}
