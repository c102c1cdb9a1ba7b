//! Shared mock gateways and record builders for agent tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use priceowl_core::catalog::*;
use priceowl_core::error::ProviderError;
use priceowl_core::message::ChatMessage;
use priceowl_core::provider::CompletionProvider;
use priceowl_core::store::{BundleStore, ComparisonService, CuratedStore, PrimaryStore};

/// Mock primary storefront with canned payloads and call counters.
#[derive(Default)]
pub struct MockPrimary {
    pub search_hits: Vec<SearchHit>,
    pub details: HashMap<String, GameDetail>,
    pub specials: Vec<Special>,
    pub featured: Vec<Special>,
    pub specials_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

#[async_trait]
impl PrimaryStore for MockPrimary {
    async fn search(&self, _query: &str, limit: usize) -> Vec<SearchHit> {
        self.search_hits.iter().take(limit).cloned().collect()
    }

    async fn detail(&self, external_id: &str) -> Option<GameDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.get(external_id).cloned()
    }

    async fn specials(&self, limit: usize) -> Vec<Special> {
        self.specials_calls.fetch_add(1, Ordering::SeqCst);
        self.specials.iter().take(limit).cloned().collect()
    }

    async fn featured(&self, limit: usize) -> Vec<Special> {
        self.featured.iter().take(limit).cloned().collect()
    }
}

/// Mock comparison service; records the last search query.
#[derive(Default)]
pub struct MockComparison {
    pub hits: Vec<ComparisonHit>,
    pub comparison: Option<PriceComparison>,
    pub deals: Vec<Deal>,
    pub stores: Vec<StoreInfo>,
    pub last_search: Mutex<Option<String>>,
    pub deals_calls: AtomicUsize,
}

#[async_trait]
impl ComparisonService for MockComparison {
    async fn search(&self, title: &str, limit: usize) -> Vec<ComparisonHit> {
        *self.last_search.lock().unwrap() = Some(title.to_string());
        self.hits.iter().take(limit).cloned().collect()
    }

    async fn game_detail(&self, _game_id: &str) -> Option<PriceComparison> {
        self.comparison.clone()
    }

    async fn deals(&self, _filters: &DealFilters, limit: usize) -> Vec<Deal> {
        self.deals_calls.fetch_add(1, Ordering::SeqCst);
        self.deals.iter().take(limit).cloned().collect()
    }

    async fn stores(&self) -> Vec<StoreInfo> {
        self.stores.clone()
    }
}

#[derive(Default)]
pub struct MockCurated {
    pub hits: Vec<CuratedGame>,
    pub deals: Vec<CuratedGame>,
    pub free: Vec<CuratedGame>,
    pub classics: Vec<CuratedGame>,
}

#[async_trait]
impl CuratedStore for MockCurated {
    async fn search(&self, _query: &str, limit: usize) -> Vec<CuratedGame> {
        self.hits.iter().take(limit).cloned().collect()
    }

    async fn deals(&self, limit: usize) -> Vec<CuratedGame> {
        self.deals.iter().take(limit).cloned().collect()
    }

    async fn free_games(&self) -> Vec<CuratedGame> {
        self.free.clone()
    }

    async fn classics(&self, limit: usize) -> Vec<CuratedGame> {
        self.classics.iter().take(limit).cloned().collect()
    }
}

#[derive(Default)]
pub struct MockBundles {
    pub bundles: Vec<Bundle>,
    pub store: Vec<CuratedGame>,
    pub hits: Vec<CuratedGame>,
}

#[async_trait]
impl BundleStore for MockBundles {
    async fn current_bundles(&self) -> Vec<Bundle> {
        self.bundles.clone()
    }

    async fn store_deals(&self, limit: usize) -> Vec<CuratedGame> {
        self.store.iter().take(limit).cloned().collect()
    }

    async fn search(&self, _query: &str) -> Vec<CuratedGame> {
        self.hits.clone()
    }
}

/// Scripted completion provider: returns the canned result on every call.
pub struct MockProvider {
    pub reply: Result<Option<String>, ()>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(Some(text.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: Ok(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _history: &[ChatMessage],
        _system_prompt: &str,
        _max_tokens: u32,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(ProviderError::Timeout),
        }
    }
}

// --- Record builders ---

pub fn special(
    external_id: &str,
    title: &str,
    final_price: Option<i64>,
    original_price: Option<i64>,
    discount: f64,
) -> Special {
    Special {
        external_id: external_id.into(),
        title: title.into(),
        discount_percent: Some(discount),
        original_price,
        final_price,
        currency: Some("RUB".into()),
    }
}

pub fn search_hit(external_id: &str, title: &str, formatted: Option<&str>) -> SearchHit {
    SearchHit {
        external_id: external_id.into(),
        title: title.into(),
        price_minor: None,
        price_formatted: formatted.map(String::from),
    }
}

pub fn game_detail(
    external_id: &str,
    title: &str,
    final_price: Option<i64>,
    genres: Vec<String>,
) -> GameDetail {
    GameDetail {
        external_id: external_id.into(),
        title: title.into(),
        kind: Some("game".into()),
        is_free: false,
        short_description: Some("A test game.".into()),
        genres,
        currency: Some("RUB".into()),
        initial_price: None,
        final_price,
        discount_percent: None,
        release_date: None,
        metacritic_score: None,
    }
}

pub fn deal(title: &str, sale: f64, normal: f64, savings: f64, store: &str) -> Deal {
    Deal {
        title: title.into(),
        store_id: "1".into(),
        store_name: store.into(),
        game_id: None,
        sale_price: sale,
        normal_price: normal,
        savings_percent: savings,
        deal_rating: None,
        steam_app_id: None,
    }
}

pub fn comparison_hit(game_id: &str, title: &str, cheapest: f64) -> ComparisonHit {
    ComparisonHit {
        game_id: game_id.into(),
        steam_app_id: None,
        title: title.into(),
        cheapest_price: cheapest,
    }
}

pub fn offer(store: &str, price: f64, retail: f64, savings: f64) -> StoreOffer {
    StoreOffer {
        store_name: store.into(),
        price,
        retail_price: retail,
        savings_percent: savings,
    }
}

pub fn price_comparison(
    game_id: &str,
    title: &str,
    cheapest_ever: Option<f64>,
    offers: Vec<StoreOffer>,
) -> PriceComparison {
    PriceComparison {
        game_id: game_id.into(),
        title: title.into(),
        cheapest_ever,
        cheapest_ever_date: None,
        offers,
    }
}

pub fn bundle(title: &str, games: &[&str]) -> Bundle {
    Bundle {
        title: title.into(),
        description: None,
        url: None,
        games: games
            .iter()
            .map(|g| BundleGame {
                title: (*g).to_string(),
            })
            .collect(),
    }
}
