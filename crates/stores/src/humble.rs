//! Humble Bundle client — bundles plus the regular Humble Store.
//!
//! Bundle listings come from the public v1 bundles endpoint; store deals
//! and search go through the store search endpoint. Prices in **major**
//! USD units.

use async_trait::async_trait;
use priceowl_core::catalog::{Bundle, BundleGame, CuratedGame};
use priceowl_core::error::StoreError;
use priceowl_core::store::BundleStore;
use serde::Deserialize;
use tracing::warn;

use crate::de::lenient_f64_opt;

const HUMBLE_API: &str = "https://www.humblebundle.com/api/v1";

/// Client for the Humble Bundle API.
pub struct HumbleClient {
    base_url: String,
    client: reqwest::Client,
}

impl HumbleClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            base_url: HUMBLE_API.to_string(),
            client: crate::build_client(timeout_secs),
        }
    }

    /// Override the API base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn try_bundles(&self) -> Result<Vec<Bundle>, StoreError> {
        let url = format!("{}/bundles", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: Vec<ApiBundle> = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;

        Ok(body
            .into_iter()
            .filter(|b| b.is_live && b.is_visible)
            .map(|b| Bundle {
                title: b.name.unwrap_or_else(|| "Unknown Bundle".into()),
                description: b.description.map(|d| truncate(&d, 200)),
                url: b
                    .url_name
                    .map(|slug| format!("https://www.humblebundle.com/bundle/{slug}")),
                games: b
                    .products
                    .into_iter()
                    .take(5)
                    .map(|p| BundleGame {
                        title: p.human_name.unwrap_or_else(|| "Unknown Game".into()),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn try_search(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<ApiStoreResult>, StoreError> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: ApiSearchResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        Ok(body.results)
    }
}

#[async_trait]
impl BundleStore for HumbleClient {
    async fn current_bundles(&self) -> Vec<Bundle> {
        match self.try_bundles().await {
            Ok(bundles) => bundles,
            Err(e) => {
                warn!(store = "humble", error = %e, "bundles fetch failed");
                Vec::new()
            }
        }
    }

    async fn store_deals(&self, limit: usize) -> Vec<CuratedGame> {
        let params = [
            ("filter", "all".to_string()),
            ("sort", "discount".into()),
            ("request", "1".into()),
            ("page", "0".into()),
            ("page_size", limit.to_string()),
        ];
        match self.try_search(&params).await {
            // Keep only items with a real markdown of at least 10%
            Ok(results) => results
                .into_iter()
                .filter_map(ApiStoreResult::into_discounted)
                .filter(|g| g.discount_percent.unwrap_or(0.0) >= 10.0)
                .collect(),
            Err(e) => {
                warn!(store = "humble", error = %e, "store deals fetch failed");
                Vec::new()
            }
        }
    }

    async fn search(&self, query: &str) -> Vec<CuratedGame> {
        let params = [
            ("search", query.to_string()),
            ("filter", "all".into()),
            ("request", "1".into()),
            ("page", "0".into()),
            ("page_size", "10".into()),
        ];
        match self.try_search(&params).await {
            Ok(results) => results.into_iter().map(ApiStoreResult::into_curated).collect(),
            Err(e) => {
                warn!(store = "humble", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }
}

// --- Wire format ---

#[derive(Deserialize)]
struct ApiBundle {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url_name: Option<String>,
    #[serde(default)]
    is_live: bool,
    #[serde(default = "default_visible")]
    is_visible: bool,
    #[serde(default)]
    products: Vec<ApiBundleProduct>,
}

fn default_visible() -> bool {
    true
}

#[derive(Deserialize)]
struct ApiBundleProduct {
    #[serde(default)]
    human_name: Option<String>,
}

#[derive(Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    results: Vec<ApiStoreResult>,
}

#[derive(Deserialize)]
struct ApiStoreResult {
    #[serde(default)]
    human_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    current_price: Option<ApiPrice>,
    #[serde(default)]
    full_price: Option<ApiPrice>,
}

#[derive(Deserialize)]
struct ApiPrice {
    #[serde(deserialize_with = "lenient_f64_opt", default)]
    amount: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

impl ApiStoreResult {
    fn into_curated(self) -> CuratedGame {
        let current = self.current_price.as_ref().and_then(|p| p.amount);
        let full = self.full_price.as_ref().and_then(|p| p.amount);
        let discount_percent = match (current, full) {
            (Some(c), Some(f)) if f > 0.0 && c < f => Some(((1.0 - c / f) * 100.0).round()),
            _ => None,
        };
        CuratedGame {
            title: self.human_name.unwrap_or_else(|| "Unknown Game".into()),
            price: current,
            original_price: full,
            discount_percent,
            currency: self
                .current_price
                .and_then(|p| p.currency)
                .or_else(|| Some("USD".into())),
            genres: Vec::new(),
            description: self.description.map(|d| truncate(&d, 150)),
            is_free: current == Some(0.0),
        }
    }

    /// As [`into_curated`](Self::into_curated), but only when both prices
    /// are present and the current one is lower.
    fn into_discounted(self) -> Option<CuratedGame> {
        let current = self.current_price.as_ref().and_then(|p| p.amount)?;
        let full = self.full_price.as_ref().and_then(|p| p.amount)?;
        if current < full {
            Some(self.into_curated())
        } else {
            None
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_bundles_are_filtered() {
        let json = r#"[
            {"name": "Live Bundle", "is_live": true, "products": [{"human_name": "Game A"}]},
            {"name": "Over", "is_live": false, "products": []}
        ]"#;
        let bundles: Vec<ApiBundle> = serde_json::from_str(json).unwrap();
        let live: Vec<_> = bundles
            .into_iter()
            .filter(|b| b.is_live && b.is_visible)
            .collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].name.as_deref(), Some("Live Bundle"));
    }

    #[test]
    fn store_result_computes_discount() {
        let json = r#"{
            "human_name": "Hollow Knight",
            "current_price": {"amount": "7.49", "currency": "USD"},
            "full_price": {"amount": "14.99", "currency": "USD"}
        }"#;
        let result: ApiStoreResult = serde_json::from_str(json).unwrap();
        let game = result.into_discounted().unwrap();
        assert_eq!(game.price, Some(7.49));
        assert_eq!(game.discount_percent, Some(50.0));
    }

    #[test]
    fn undiscounted_result_is_not_a_deal() {
        let json = r#"{
            "human_name": "Full Price Game",
            "current_price": {"amount": 19.99},
            "full_price": {"amount": 19.99}
        }"#;
        let result: ApiStoreResult = serde_json::from_str(json).unwrap();
        assert!(result.into_discounted().is_none());
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_empty() {
        let client = HumbleClient::new(1).with_base_url("http://127.0.0.1:9/api/v1");
        assert!(client.current_bundles().await.is_empty());
        assert!(client.store_deals(5).await.is_empty());
    }
}
