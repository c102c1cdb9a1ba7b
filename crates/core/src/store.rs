//! Source gateway traits — the agent's view of the outside market.
//!
//! All four gateways share one contract: a call either succeeds or the
//! failure is caught and logged inside the implementation, which then
//! returns an empty list / `None`. Nothing here returns `Result`; the core
//! tolerates stale or missing source data silently.
//!
//! Price units differ per gateway and are fixed by contract:
//! - [`PrimaryStore`] (Steam): minor currency units (kopecks);
//! - [`ComparisonService`] (CheapShark), [`CuratedStore`] (GOG) and
//!   [`BundleStore`] (Humble): major units (USD).

use crate::catalog::*;
use async_trait::async_trait;

/// The primary storefront: unauthenticated catalog and price queries.
///
/// Rate-limited upstream; callers are expected to keep request rates low
/// (the monitoring cycle inserts a courtesy delay between detail fetches).
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Search the catalog by title. Empty on failure.
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit>;

    /// Full detail for one catalog item. `None` on failure or unknown id.
    async fn detail(&self, external_id: &str) -> Option<GameDetail>;

    /// Currently discounted items. Empty on failure.
    async fn specials(&self, limit: usize) -> Vec<Special>;

    /// Featured/recommended items. Empty on failure.
    async fn featured(&self, limit: usize) -> Vec<Special>;
}

/// The cross-platform price comparison service.
#[async_trait]
pub trait ComparisonService: Send + Sync {
    /// Search titles across all stores. Empty on failure.
    async fn search(&self, title: &str, limit: usize) -> Vec<ComparisonHit>;

    /// Current offers plus historical floor for one title.
    async fn game_detail(&self, game_id: &str) -> Option<PriceComparison>;

    /// Current deals matching `filters`. Empty on failure.
    async fn deals(&self, filters: &DealFilters, limit: usize) -> Vec<Deal>;

    /// Best-rated deals across all stores. Empty on failure.
    async fn top_deals(&self, limit: usize) -> Vec<Deal> {
        self.deals(&DealFilters::top_rated(), limit).await
    }

    /// Zero-price items. Empty on failure.
    async fn free_games(&self, limit: usize) -> Vec<Deal> {
        self.deals(&DealFilters::free_only(), limit).await
    }

    /// Stores the service indexes. Empty on failure.
    async fn stores(&self) -> Vec<StoreInfo>;
}

/// A secondary storefront with a curated catalog (DRM-free classics).
#[async_trait]
pub trait CuratedStore: Send + Sync {
    /// Search the catalog by title. Empty on failure.
    async fn search(&self, query: &str, limit: usize) -> Vec<CuratedGame>;

    /// Currently discounted items. Empty on failure.
    async fn deals(&self, limit: usize) -> Vec<CuratedGame>;

    /// Free items. Empty on failure.
    async fn free_games(&self) -> Vec<CuratedGame>;

    /// The curated classic/retro catalog. Empty on failure.
    async fn classics(&self, limit: usize) -> Vec<CuratedGame>;
}

/// The bundle storefront.
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// Currently running bundles. Empty on failure.
    async fn current_bundles(&self) -> Vec<Bundle>;

    /// Discounts in the store's regular shop. Empty on failure.
    async fn store_deals(&self, limit: usize) -> Vec<CuratedGame>;

    /// Search the store by title. Empty on failure.
    async fn search(&self, query: &str) -> Vec<CuratedGame>;
}
