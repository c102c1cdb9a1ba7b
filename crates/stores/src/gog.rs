//! GOG.com client — the secondary, DRM-free storefront.
//!
//! Uses the embed catalog filter endpoint for deals, free games, search
//! and the curated classics listing. Prices are in **major** units.

use async_trait::async_trait;
use priceowl_core::catalog::CuratedGame;
use priceowl_core::error::StoreError;
use priceowl_core::store::CuratedStore;
use serde::Deserialize;
use tracing::warn;

use crate::de::lenient_f64_opt;

const GOG_EMBED_API: &str = "https://embed.gog.com";

/// Client for the GOG catalog API.
pub struct GogClient {
    base_url: String,
    client: reqwest::Client,
}

impl GogClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            base_url: GOG_EMBED_API.to_string(),
            client: crate::build_client(timeout_secs),
        }
    }

    /// Override the API base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn try_filter(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<ApiProduct>, StoreError> {
        let url = format!("{}/products/ajax/filter", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(crate::transport_error)?;
        crate::check_status(&resp)?;

        let body: ApiFilterResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        Ok(body.products)
    }
}

#[async_trait]
impl CuratedStore for GogClient {
    async fn search(&self, query: &str, limit: usize) -> Vec<CuratedGame> {
        let params = [
            ("search", query.to_string()),
            ("limit", limit.to_string()),
            ("page", "1".into()),
            ("sort", "popularity:desc".into()),
        ];
        match self.try_filter(&params).await {
            Ok(products) => products.into_iter().map(ApiProduct::into_curated).collect(),
            Err(e) => {
                warn!(store = "gog", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn deals(&self, limit: usize) -> Vec<CuratedGame> {
        let params = [
            ("sort", "discount:desc".to_string()),
            ("limit", limit.to_string()),
            ("page", "1".into()),
        ];
        match self.try_filter(&params).await {
            // Only genuinely discounted items count as deals
            Ok(products) => products
                .into_iter()
                .filter(|p| p.price.as_ref().is_some_and(|pr| pr.discount.unwrap_or(0.0) > 0.0))
                .map(ApiProduct::into_curated)
                .collect(),
            Err(e) => {
                warn!(store = "gog", error = %e, "deals fetch failed");
                Vec::new()
            }
        }
    }

    async fn free_games(&self) -> Vec<CuratedGame> {
        let params = [
            ("price", "free".to_string()),
            ("sort", "title:asc".into()),
            ("limit", "10".into()),
            ("page", "1".into()),
        ];
        match self.try_filter(&params).await {
            Ok(products) => products.into_iter().map(ApiProduct::into_curated).collect(),
            Err(e) => {
                warn!(store = "gog", error = %e, "free games fetch failed");
                Vec::new()
            }
        }
    }

    async fn classics(&self, limit: usize) -> Vec<CuratedGame> {
        let params = [
            ("genre", "classic".to_string()),
            ("limit", limit.to_string()),
            ("page", "1".into()),
            ("sort", "popularity:desc".into()),
        ];
        match self.try_filter(&params).await {
            Ok(products) => products.into_iter().map(ApiProduct::into_curated).collect(),
            Err(e) => {
                warn!(store = "gog", error = %e, "classics fetch failed");
                Vec::new()
            }
        }
    }
}

// --- Wire format ---

#[derive(Deserialize)]
struct ApiFilterResponse {
    #[serde(default)]
    products: Vec<ApiProduct>,
}

#[derive(Deserialize)]
struct ApiProduct {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<ApiPrice>,
    #[serde(default)]
    genres: Vec<ApiGenre>,
}

#[derive(Deserialize)]
struct ApiPrice {
    #[serde(rename = "baseAmount", deserialize_with = "lenient_f64_opt", default)]
    base_amount: Option<f64>,
    #[serde(rename = "finalAmount", deserialize_with = "lenient_f64_opt", default)]
    final_amount: Option<f64>,
    #[serde(deserialize_with = "lenient_f64_opt", default)]
    discount: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiGenre {
    Named { name: String },
    Plain(String),
}

impl ApiGenre {
    fn into_name(self) -> String {
        match self {
            ApiGenre::Named { name } => name,
            ApiGenre::Plain(name) => name,
        }
    }
}

impl ApiProduct {
    fn into_curated(self) -> CuratedGame {
        let price = self.price;
        let final_amount = price.as_ref().and_then(|p| p.final_amount);
        CuratedGame {
            title: self.title.unwrap_or_default(),
            price: final_amount,
            original_price: price.as_ref().and_then(|p| p.base_amount),
            discount_percent: price.as_ref().and_then(|p| p.discount),
            currency: price
                .and_then(|p| p.currency)
                .or_else(|| Some("USD".into())),
            genres: self
                .genres
                .into_iter()
                .map(ApiGenre::into_name)
                .take(3)
                .collect(),
            description: self.description.map(|d| truncate(&d, 150)),
            is_free: final_amount == Some(0.0),
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
