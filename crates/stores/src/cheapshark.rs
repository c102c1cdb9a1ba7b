//! CheapShark API client — the cross-platform price comparison service.
//!
//! Free, unauthenticated API covering Steam, GOG, Epic, Humble and a few
//! dozen smaller stores. All prices in **major** USD units, frequently
//! encoded as strings — see [`crate::de`].

use async_trait::async_trait;
use priceowl_core::catalog::{
    ComparisonHit, Deal, DealFilters, PriceComparison, StoreInfo, StoreOffer,
};
use priceowl_core::error::StoreError;
use priceowl_core::store::ComparisonService;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::de::{lenient_f64, lenient_f64_opt};

const CHEAPSHARK_API: &str = "https://www.cheapshark.com/api/1.0";

/// Store id → name for the stores users actually see in replies.
/// Used so deal formatting does not require a `/stores` round trip;
/// unknown ids fall back to `Store #<id>`.
const KNOWN_STORES: &[(&str, &str)] = &[
    ("1", "Steam"),
    ("2", "GamersGate"),
    ("3", "GreenManGaming"),
    ("7", "GOG"),
    ("8", "Origin"),
    ("11", "Humble Store"),
    ("13", "Uplay"),
    ("15", "Fanatical"),
    ("21", "WinGameStore"),
    ("23", "GameBillet"),
    ("24", "Voidu"),
    ("25", "Epic Games Store"),
    ("27", "Gamesplanet"),
    ("28", "Gamesload"),
    ("29", "2Game"),
    ("30", "IndieGala"),
    ("31", "Blizzard Shop"),
    ("33", "DLGamer"),
    ("34", "Noctre"),
    ("35", "Dreamgame"),
];

fn store_name(store_id: &str) -> String {
    KNOWN_STORES
        .iter()
        .find(|(id, _)| *id == store_id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Store #{store_id}"))
}

/// Client for the CheapShark API.
pub struct CheapSharkClient {
    base_url: String,
    client: reqwest::Client,
    // /stores is static data; fetched once per process
    stores_cache: RwLock<Option<Vec<StoreInfo>>>,
}

impl CheapSharkClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            base_url: CHEAPSHARK_API.to_string(),
            client: crate::build_client(timeout_secs),
            stores_cache: RwLock::new(None),
        }
    }

    /// Override the API base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn try_search(&self, title: &str, limit: usize) -> Result<Vec<ComparisonHit>, StoreError> {
        let url = format!("{}/games", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("title", title), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: Vec<ApiGameHit> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .into_iter()
            .map(|g| ComparisonHit {
                game_id: g.game_id,
                steam_app_id: g.steam_app_id,
                title: g.external,
                cheapest_price: g.cheapest,
            })
            .collect())
    }

    async fn try_game_detail(&self, game_id: &str) -> Result<Option<PriceComparison>, StoreError> {
        let url = format!("{}/games", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("id", game_id)])
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: Option<ApiGameDetail> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        let Some(body) = body else {
            return Ok(None);
        };

        let offers = body
            .deals
            .into_iter()
            .map(|d| StoreOffer {
                store_name: store_name(&d.store_id),
                price: d.price,
                retail_price: d.retail_price,
                savings_percent: d.savings,
            })
            .collect();

        Ok(Some(PriceComparison {
            game_id: game_id.to_string(),
            title: body.info.title.unwrap_or_default(),
            cheapest_ever: body.cheapest_price_ever.as_ref().map(|c| c.price),
            cheapest_ever_date: body
                .cheapest_price_ever
                .and_then(|c| c.date)
                .and_then(|epoch| chrono::DateTime::from_timestamp(epoch, 0))
                .map(|dt| dt.format("%Y-%m-%d").to_string()),
            offers,
        }))
    }

    async fn try_deals(&self, filters: &DealFilters, limit: usize) -> Result<Vec<Deal>, StoreError> {
        let url = format!("{}/deals", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("pageSize", limit.to_string()),
            ("desc", if filters.descending { "1" } else { "0" }.into()),
        ];
        if let Some(sort_by) = &filters.sort_by {
            query.push(("sortBy", sort_by.clone()));
        }
        if let Some(store_id) = &filters.store_id {
            query.push(("storeID", store_id.clone()));
        }
        if let Some(upper) = filters.upper_price {
            query.push(("upperPrice", upper.to_string()));
        }
        if let Some(lower) = filters.lower_price {
            query.push(("lowerPrice", lower.to_string()));
        }
        if let Some(metacritic) = filters.min_metacritic {
            query.push(("metacritic", metacritic.to_string()));
        }
        if filters.on_sale {
            query.push(("onSale", "1".into()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: Vec<ApiDeal> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .into_iter()
            .map(|d| Deal {
                title: d.title,
                store_name: store_name(&d.store_id),
                store_id: d.store_id,
                game_id: d.game_id,
                sale_price: d.sale_price,
                normal_price: d.normal_price,
                savings_percent: d.savings,
                deal_rating: d.deal_rating,
                steam_app_id: d.steam_app_id,
            })
            .collect())
    }

    async fn try_stores(&self) -> Result<Vec<StoreInfo>, StoreError> {
        if let Some(cached) = self.stores_cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let url = format!("{}/stores", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: Vec<ApiStore> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        let stores: Vec<StoreInfo> = body
            .into_iter()
            .map(|s| StoreInfo {
                id: s.store_id,
                name: s.store_name,
                active: s.is_active != 0,
            })
            .collect();

        *self.stores_cache.write().await = Some(stores.clone());
        Ok(stores)
    }
}

#[async_trait]
impl ComparisonService for CheapSharkClient {
    async fn search(&self, title: &str, limit: usize) -> Vec<ComparisonHit> {
        match self.try_search(title, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(store = "cheapshark", title, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn game_detail(&self, game_id: &str) -> Option<PriceComparison> {
        match self.try_game_detail(game_id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(store = "cheapshark", game_id, error = %e, "game detail failed");
                None
            }
        }
    }

    async fn deals(&self, filters: &DealFilters, limit: usize) -> Vec<Deal> {
        match self.try_deals(filters, limit).await {
            Ok(deals) => deals,
            Err(e) => {
                warn!(store = "cheapshark", error = %e, "deals fetch failed");
                Vec::new()
            }
        }
    }

    async fn stores(&self) -> Vec<StoreInfo> {
        match self.try_stores().await {
            Ok(stores) => stores,
            Err(e) => {
                warn!(store = "cheapshark", error = %e, "stores fetch failed");
                Vec::new()
            }
        }
    }
}

// --- Wire format ---

#[derive(Deserialize)]
struct ApiGameHit {
    #[serde(rename = "gameID")]
    game_id: String,
    #[serde(rename = "steamAppID", default)]
    steam_app_id: Option<String>,
    /// CheapShark calls the title "external".
    external: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    cheapest: f64,
}

#[derive(Deserialize)]
struct ApiGameDetail {
    #[serde(default)]
    info: ApiGameInfo,
    #[serde(rename = "cheapestPriceEver", default)]
    cheapest_price_ever: Option<ApiCheapestEver>,
    #[serde(default)]
    deals: Vec<ApiGameDeal>,
}

#[derive(Deserialize, Default)]
struct ApiGameInfo {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct ApiCheapestEver {
    #[serde(deserialize_with = "lenient_f64", default)]
    price: f64,
    #[serde(default)]
    date: Option<i64>,
}

#[derive(Deserialize)]
struct ApiGameDeal {
    #[serde(rename = "storeID")]
    store_id: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    price: f64,
    #[serde(rename = "retailPrice", deserialize_with = "lenient_f64", default)]
    retail_price: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    savings: f64,
}

#[derive(Deserialize)]
struct ApiDeal {
    title: String,
    #[serde(rename = "storeID")]
    store_id: String,
    #[serde(rename = "gameID", default)]
    game_id: Option<String>,
    #[serde(rename = "salePrice", deserialize_with = "lenient_f64", default)]
    sale_price: f64,
    #[serde(rename = "normalPrice", deserialize_with = "lenient_f64", default)]
    normal_price: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    savings: f64,
    #[serde(rename = "dealRating", deserialize_with = "lenient_f64_opt", default)]
    deal_rating: Option<f64>,
    #[serde(rename = "steamAppID", default)]
    steam_app_id: Option<String>,
}

#[derive(Deserialize)]
struct ApiStore {
    #[serde(rename = "storeID")]
    store_id: String,
    #[serde(rename = "storeName")]
    store_name: String,
    #[serde(rename = "isActive", default)]
    is_active: i64,
}
