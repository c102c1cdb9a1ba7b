//! The agent's beliefs: everything it currently knows about the market.
//!
//! Four pieces of state live here: the watchlist, the append-only trend
//! event log, and cached snapshots of the latest specials and top deals.
//! All of it is in-memory and lost on restart.

use chrono::{DateTime, Utc};
use priceowl_core::catalog::{Deal, GameDetail, Special};
use priceowl_core::event::TrendEvent;
use priceowl_core::game::Game;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A price refresh produced by the monitoring cycle for one entry.
///
/// Prices are already converted to major units.
#[derive(Debug, Clone)]
pub struct PricingUpdate {
    pub current_price: f64,
    pub discount_percent: Option<f64>,
    pub original_price: Option<f64>,
    pub detail: GameDetail,
}

#[derive(Default)]
struct Beliefs {
    /// Watchlist in first-insert order; upserts keep the original slot.
    watchlist: Vec<Game>,
    /// Append-only. Never truncated.
    events: Vec<TrendEvent>,
    specials: Vec<Special>,
    top_deals: Vec<Deal>,
    last_refresh: Option<DateTime<Utc>>,
}

/// Shared, mutable belief state. Cheap to clone behind an `Arc`.
#[derive(Default)]
pub struct BeliefStore {
    inner: RwLock<Beliefs>,
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert every entry, keyed by `Game::id`.
    ///
    /// Existing entries are overwritten in place and keep their position;
    /// new entries append. Entries absent from `entries` are never evicted.
    pub async fn replace_watchlist(&self, entries: Vec<Game>) {
        let mut beliefs = self.inner.write().await;
        for entry in entries {
            match beliefs.watchlist.iter_mut().find(|g| g.id == entry.id) {
                Some(slot) => *slot = entry,
                None => beliefs.watchlist.push(entry),
            }
        }
    }

    /// The watchlist in first-insert order.
    pub async fn watchlist(&self) -> Vec<Game> {
        self.inner.read().await.watchlist.clone()
    }

    /// Apply a monitoring-cycle price refresh to one entry.
    ///
    /// No-op when the id is gone (the entry was replaced mid-cycle).
    pub async fn apply_pricing(&self, game_id: &str, update: PricingUpdate) {
        let mut beliefs = self.inner.write().await;
        if let Some(game) = beliefs.watchlist.iter_mut().find(|g| g.id == game_id) {
            game.current_price = Some(update.current_price);
            game.discount_percent = update.discount_percent;
            if update.original_price.is_some() {
                game.original_price = update.original_price;
            }
            game.detail = Some(update.detail);
        }
    }

    /// Append an event, assigning a fresh id when the caller left it blank.
    pub async fn record_event(&self, mut event: TrendEvent) {
        if event.id.is_empty() {
            event.id = format!("event_{}", Uuid::new_v4().simple());
        }
        self.inner.write().await.events.push(event);
    }

    /// The last `limit` events, oldest first.
    pub async fn recent_events(&self, limit: usize) -> Vec<TrendEvent> {
        let beliefs = self.inner.read().await;
        let start = beliefs.events.len().saturating_sub(limit);
        beliefs.events[start..].to_vec()
    }

    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn set_specials(&self, specials: Vec<Special>) {
        self.inner.write().await.specials = specials;
    }

    pub async fn specials(&self) -> Vec<Special> {
        self.inner.read().await.specials.clone()
    }

    pub async fn set_top_deals(&self, deals: Vec<Deal>) {
        self.inner.write().await.top_deals = deals;
    }

    pub async fn top_deals(&self) -> Vec<Deal> {
        self.inner.read().await.top_deals.clone()
    }

    /// Stamp the completion of a monitoring iteration.
    pub async fn touch_refreshed(&self) {
        self.inner.write().await.last_refresh = Some(Utc::now());
    }

    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_refresh
    }
}
