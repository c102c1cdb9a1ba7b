//! Steam Store API client — the primary storefront.
//!
//! Works against the public storefront API (no key required for catalog
//! and price queries). Prices are reported in **minor** currency units
//! (kopecks for the RU region) and are passed through unconverted; the
//! agent converts when it stores them.

use async_trait::async_trait;
use priceowl_config::RegionConfig;
use priceowl_core::catalog::{GameDetail, SearchHit, Special};
use priceowl_core::error::StoreError;
use priceowl_core::store::PrimaryStore;
use serde::Deserialize;
use tracing::warn;

const STEAM_STORE_API: &str = "https://store.steampowered.com/api";

/// Client for the Steam Store API.
pub struct SteamClient {
    base_url: String,
    region: RegionConfig,
    client: reqwest::Client,
}

impl SteamClient {
    /// Create a client with the given region settings and request timeout.
    pub fn new(region: RegionConfig, timeout_secs: u64) -> Self {
        Self {
            base_url: STEAM_STORE_API.to_string(),
            region,
            client: crate::build_client(timeout_secs),
        }
    }

    /// Override the API base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn region_params(&self) -> [(&'static str, &str); 2] {
        [("cc", &self.region.country), ("l", &self.region.language)]
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, StoreError> {
        let url = format!("{}/storesearch/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&self.region_params())
            .query(&[("term", query)])
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: ApiSearchResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .items
            .into_iter()
            .take(limit)
            .map(|item| SearchHit {
                external_id: item.id.to_string(),
                title: item.name,
                price_minor: item.price.as_ref().map(|p| p.r#final),
                price_formatted: item.price.and_then(|p| p.final_formatted),
            })
            .collect())
    }

    async fn try_detail(&self, external_id: &str) -> Result<Option<GameDetail>, StoreError> {
        let url = format!("{}/appdetails", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&self.region_params())
            .query(&[("appids", external_id)])
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: std::collections::HashMap<String, ApiAppEntry> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        let Some(entry) = body.get(external_id) else {
            return Ok(None);
        };
        if !entry.success {
            return Ok(None);
        }
        let Some(data) = &entry.data else {
            return Ok(None);
        };

        let price = data.price_overview.as_ref();
        Ok(Some(GameDetail {
            external_id: external_id.to_string(),
            title: data.name.clone().unwrap_or_default(),
            kind: data.r#type.clone(),
            is_free: data.is_free,
            short_description: data.short_description.clone(),
            genres: data
                .genres
                .iter()
                .filter_map(|g| g.description.clone())
                .collect(),
            currency: price.map(|p| p.currency.clone()),
            initial_price: price.and_then(|p| p.initial),
            final_price: price.and_then(|p| p.r#final),
            discount_percent: price.and_then(|p| p.discount_percent),
            release_date: data.release_date.as_ref().and_then(|r| r.date.clone()),
            metacritic_score: data.metacritic.as_ref().and_then(|m| m.score),
        }))
    }

    async fn try_specials(&self, limit: usize) -> Result<Vec<Special>, StoreError> {
        let url = format!("{}/featuredcategories", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&self.region_params())
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: ApiFeaturedCategories = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .specials
            .map(|s| s.items)
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(ApiFeaturedItem::into_special)
            .collect())
    }

    async fn try_featured(&self, limit: usize) -> Result<Vec<Special>, StoreError> {
        let url = format!("{}/featured", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&self.region_params())
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: ApiFeatured = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .featured_win
            .into_iter()
            .take(limit)
            .map(ApiFeaturedItem::into_special)
            .collect())
    }
}

#[async_trait]
impl PrimaryStore for SteamClient {
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        match self.try_search(query, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(store = "steam", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn detail(&self, external_id: &str) -> Option<GameDetail> {
        match self.try_detail(external_id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(store = "steam", app_id = external_id, error = %e, "detail fetch failed");
                None
            }
        }
    }

    async fn specials(&self, limit: usize) -> Vec<Special> {
        match self.try_specials(limit).await {
            Ok(specials) => specials,
            Err(e) => {
                warn!(store = "steam", error = %e, "specials fetch failed");
                Vec::new()
            }
        }
    }

    async fn featured(&self, limit: usize) -> Vec<Special> {
        match self.try_featured(limit).await {
            Ok(featured) => featured,
            Err(e) => {
                warn!(store = "steam", error = %e, "featured fetch failed");
                Vec::new()
            }
        }
    }
}

// --- Wire format ---

#[derive(Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    items: Vec<ApiSearchItem>,
}

#[derive(Deserialize)]
struct ApiSearchItem {
    id: i64,
    name: String,
    #[serde(default)]
    price: Option<ApiSearchPrice>,
}

#[derive(Deserialize)]
struct ApiSearchPrice {
    r#final: i64,
    #[serde(default)]
    final_formatted: Option<String>,
}

#[derive(Deserialize)]
struct ApiAppEntry {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ApiAppData>,
}

#[derive(Deserialize)]
struct ApiAppData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default)]
    is_free: bool,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    genres: Vec<ApiGenre>,
    #[serde(default)]
    release_date: Option<ApiReleaseDate>,
    #[serde(default)]
    metacritic: Option<ApiMetacritic>,
    #[serde(default)]
    price_overview: Option<ApiPriceOverview>,
}

#[derive(Deserialize)]
struct ApiGenre {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct ApiReleaseDate {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
struct ApiMetacritic {
    #[serde(default)]
    score: Option<i64>,
}

#[derive(Deserialize)]
struct ApiPriceOverview {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    initial: Option<i64>,
    #[serde(default)]
    r#final: Option<i64>,
    #[serde(default)]
    discount_percent: Option<f64>,
}

fn default_currency() -> String {
    "RUB".into()
}

#[derive(Deserialize)]
struct ApiFeaturedCategories {
    #[serde(default)]
    specials: Option<ApiSpecials>,
}

#[derive(Deserialize)]
struct ApiSpecials {
    #[serde(default)]
    items: Vec<ApiFeaturedItem>,
}

#[derive(Deserialize)]
struct ApiFeatured {
    #[serde(default)]
    featured_win: Vec<ApiFeaturedItem>,
}

#[derive(Deserialize)]
struct ApiFeaturedItem {
    id: i64,
    name: String,
    #[serde(default)]
    discount_percent: Option<f64>,
    #[serde(default)]
    original_price: Option<i64>,
    #[serde(default)]
    final_price: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
}

impl ApiFeaturedItem {
    fn into_special(self) -> Special {
        Special {
            external_id: self.id.to_string(),
            title: self.name,
            discount_percent: self.discount_percent,
            original_price: self.original_price,
            final_price: self.final_price,
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_details_maps_price_overview() {
        let json = r#"{
            "440": {
                "success": true,
                "data": {
                    "name": "Team Fortress 2",
                    "type": "game",
                    "is_free": true,
                    "short_description": "Nine classes.",
                    "genres": [{"id": "1", "description": "Action"}],
                    "release_date": {"coming_soon": false, "date": "10 Oct, 2007"},
                    "metacritic": {"score": 92},
                    "price_overview": {
                        "currency": "RUB",
                        "initial": 49900,
                        "final": 4999,
                        "discount_percent": 90
                    }
                }
            }
        }"#;
        let body: std::collections::HashMap<String, ApiAppEntry> =
            serde_json::from_str(json).unwrap();
        let entry = &body["440"];
        assert!(entry.success);
        let data = entry.data.as_ref().unwrap();
        let price = data.price_overview.as_ref().unwrap();
        assert_eq!(price.r#final, Some(4999));
        assert_eq!(price.initial, Some(49900));
        assert_eq!(data.genres[0].description.as_deref(), Some("Action"));
    }

    #[test]
    fn unsuccessful_lookup_has_no_data() {
        let json = r#"{"999999": {"success": false}}"#;
        let body: std::collections::HashMap<String, ApiAppEntry> =
            serde_json::from_str(json).unwrap();
        assert!(!body["999999"].success);
        assert!(body["999999"].data.is_none());
    }

    #[test]
    fn search_items_tolerate_missing_price() {
        let json = r#"{"items": [{"id": 620, "name": "Portal 2"}]}"#;
        let body: ApiSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.items.len(), 1);
        assert!(body.items[0].price.is_none());
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_empty() {
        let client = SteamClient::new(RegionConfig::default(), 1)
            .with_base_url("http://127.0.0.1:9/api");
        assert!(client.search("portal", 5).await.is_empty());
        assert!(client.detail("620").await.is_none());
        assert!(client.specials(5).await.is_empty());
    }
}
