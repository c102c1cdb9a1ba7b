//! The `DealAgent` facade: one object the HTTP layer talks to.
//!
//! All collaborators are injected as trait objects, so the whole agent
//! runs against mocks in tests and against the real gateways in the
//! binary. The agent owns its belief store and the monitoring task.

use std::sync::Arc;
use std::time::Duration;

use priceowl_config::MonitorConfig;
use priceowl_core::catalog::{
    Bundle, ComparisonHit, CuratedGame, Deal, DealFilters, GameDetail, PriceComparison, SearchHit,
    Special, StoreInfo,
};
use priceowl_core::event::TrendEvent;
use priceowl_core::game::Game;
use priceowl_core::message::{ChatMessage, ChatResponse};
use priceowl_core::provider::CompletionProvider;
use priceowl_core::store::{BundleStore, ComparisonService, CuratedStore, PrimaryStore};
use tokio::sync::Mutex;
use tracing::debug;

use crate::beliefs::BeliefStore;
use crate::composer::ResponseComposer;
use crate::context::ContextAssembler;
use crate::monitor::{Monitor, MonitorHandle};

pub struct DealAgent {
    beliefs: Arc<BeliefStore>,
    primary: Arc<dyn PrimaryStore>,
    comparison: Arc<dyn ComparisonService>,
    curated: Arc<dyn CuratedStore>,
    bundles: Arc<dyn BundleStore>,
    monitor: Arc<Monitor>,
    monitor_handle: Mutex<Option<MonitorHandle>>,
    composer: ResponseComposer,
    config: MonitorConfig,
}

impl DealAgent {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        comparison: Arc<dyn ComparisonService>,
        curated: Arc<dyn CuratedStore>,
        bundles: Arc<dyn BundleStore>,
        provider: Option<Arc<dyn CompletionProvider>>,
        config: MonitorConfig,
        max_reply_tokens: u32,
    ) -> Self {
        let beliefs = Arc::new(BeliefStore::new());
        let monitor = Arc::new(Monitor::new(
            primary.clone(),
            comparison.clone(),
            beliefs.clone(),
            config.clone(),
        ));
        let assembler = ContextAssembler::new(
            primary.clone(),
            comparison.clone(),
            curated.clone(),
            bundles.clone(),
            beliefs.clone(),
        );
        let composer = ResponseComposer::new(assembler, provider, max_reply_tokens);

        Self {
            beliefs,
            primary,
            comparison,
            curated,
            bundles,
            monitor,
            monitor_handle: Mutex::new(None),
            composer,
            config,
        }
    }

    // --- Watchlist and events ---

    pub async fn watchlist(&self) -> Vec<Game> {
        self.beliefs.watchlist().await
    }

    /// Upsert the submitted entries, then refresh their prices right away.
    pub async fn apply_watchlist(&self, entries: Vec<Game>) -> Vec<Game> {
        self.beliefs.replace_watchlist(entries).await;
        self.monitor.refresh_watchlist().await;
        self.beliefs.watchlist().await
    }

    pub async fn recent_events(&self, limit: usize) -> Vec<TrendEvent> {
        self.beliefs.recent_events(limit).await
    }

    /// Default event page size from config.
    pub fn events_limit(&self) -> usize {
        self.config.events_limit
    }

    // --- Chat ---

    pub async fn chat(&self, messages: &[ChatMessage]) -> ChatResponse {
        self.composer.chat(messages).await
    }

    pub fn provider_available(&self) -> bool {
        self.composer.provider_available()
    }

    // --- Monitoring lifecycle ---

    /// Start the recurring monitoring task. A second call while the task
    /// is alive is a no-op.
    pub async fn start_monitoring(&self, interval: Duration) {
        let mut slot = self.monitor_handle.lock().await;
        if let Some(handle) = slot.as_ref()
            && handle.is_running()
        {
            debug!("monitoring already running");
            return;
        }
        *slot = Some(self.monitor.spawn(interval));
    }

    /// Stop the monitoring task, waiting for its current step to finish.
    pub async fn stop_monitoring(&self) {
        let handle = self.monitor_handle.lock().await.take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    pub async fn monitoring_active(&self) -> bool {
        self.monitor_handle
            .lock()
            .await
            .as_ref()
            .is_some_and(MonitorHandle::is_running)
    }

    // --- Market queries (pass-throughs for the HTTP layer) ---

    pub async fn search_games(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.primary.search(query, limit).await
    }

    pub async fn game_detail(&self, app_id: &str) -> Option<GameDetail> {
        self.primary.detail(app_id).await
    }

    pub async fn specials(&self, limit: usize) -> Vec<Special> {
        self.primary.specials(limit).await
    }

    pub async fn featured(&self, limit: usize) -> Vec<Special> {
        self.primary.featured(limit).await
    }

    pub async fn top_deals(&self, limit: usize) -> Vec<Deal> {
        self.comparison.top_deals(limit).await
    }

    pub async fn deals(&self, filters: &DealFilters, limit: usize) -> Vec<Deal> {
        self.comparison.deals(filters, limit).await
    }

    pub async fn free_games(&self, limit: usize) -> Vec<Deal> {
        self.comparison.free_games(limit).await
    }

    pub async fn stores(&self) -> Vec<StoreInfo> {
        self.comparison.stores().await
    }

    pub async fn classics(&self, limit: usize) -> Vec<CuratedGame> {
        self.curated.classics(limit).await
    }

    pub async fn bundles(&self) -> Vec<Bundle> {
        self.bundles.current_bundles().await
    }

    pub async fn store_deals(&self, limit: usize) -> Vec<CuratedGame> {
        self.bundles.store_deals(limit).await
    }

    /// Compare prices for a title: first comparison hit, full detail.
    pub async fn compare_prices(&self, title: &str) -> Option<PriceComparison> {
        let hits: Vec<ComparisonHit> = self.comparison.search(title, 1).await;
        let hit = hits.first()?;
        self.comparison.game_detail(&hit.game_id).await
    }
}
