//! Typed records for everything the source gateways return.
//!
//! The upstream APIs are schema-free JSON; each gateway maps its payloads
//! into these records so the context assembler never touches upstream field
//! names directly.
//!
//! Price unit conventions (documented per gateway, see the trait docs):
//! - the primary storefront reports prices in **minor** units (kopecks),
//!   carried here as `i64` fields named `*_price` on [`Special`] and
//!   [`GameDetail`];
//! - the comparison service and the curated/bundle stores report **major**
//!   units (USD), carried as `f64`.

use serde::{Deserialize, Serialize};

/// A single hit from the primary storefront's title search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Catalog id in the storefront (Steam AppID).
    pub external_id: String,
    pub title: String,
    /// Final price in minor units, `None` for free or unpriced items.
    #[serde(default)]
    pub price_minor: Option<i64>,
    /// Upstream-formatted price string, when provided.
    #[serde(default)]
    pub price_formatted: Option<String>,
}

/// Full item detail from the primary storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetail {
    pub external_id: String,
    pub title: String,
    /// Item kind as reported upstream: "game", "dlc", "demo", ...
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// List price in minor units.
    #[serde(default)]
    pub initial_price: Option<i64>,
    /// Discounted price in minor units.
    #[serde(default)]
    pub final_price: Option<i64>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub metacritic_score: Option<i64>,
}

/// One discounted item from the primary storefront's specials list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Special {
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    /// List price in minor units.
    #[serde(default)]
    pub original_price: Option<i64>,
    /// Discounted price in minor units.
    #[serde(default)]
    pub final_price: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A current deal from the comparison service. Prices in USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub title: String,
    pub store_id: String,
    pub store_name: String,
    #[serde(default)]
    pub game_id: Option<String>,
    pub sale_price: f64,
    pub normal_price: f64,
    pub savings_percent: f64,
    #[serde(default)]
    pub deal_rating: Option<f64>,
    #[serde(default)]
    pub steam_app_id: Option<String>,
}

/// Filters for the comparison service's deal listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealFilters {
    #[serde(default)]
    pub store_id: Option<String>,
    /// Maximum price in USD.
    #[serde(default)]
    pub upper_price: Option<f64>,
    /// Minimum price in USD.
    #[serde(default)]
    pub lower_price: Option<f64>,
    #[serde(default)]
    pub min_metacritic: Option<i64>,
    #[serde(default = "default_on_sale")]
    pub on_sale: bool,
    /// Upstream sort key: "Deal Rating", "Savings", "Price", ...
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub descending: bool,
}

fn default_on_sale() -> bool {
    true
}

impl Default for DealFilters {
    fn default() -> Self {
        Self {
            store_id: None,
            upper_price: None,
            lower_price: None,
            min_metacritic: None,
            on_sale: default_on_sale(),
            sort_by: None,
            descending: false,
        }
    }
}

impl DealFilters {
    /// Filters for the best-rated deals across all stores.
    pub fn top_rated() -> Self {
        Self {
            sort_by: Some("Deal Rating".into()),
            descending: true,
            ..Self::default()
        }
    }

    /// Filters matching only zero-price items.
    pub fn free_only() -> Self {
        Self {
            upper_price: Some(0.0),
            lower_price: Some(0.0),
            on_sale: false,
            ..Self::default()
        }
    }
}

/// A title-search hit from the comparison service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonHit {
    pub game_id: String,
    #[serde(default)]
    pub steam_app_id: Option<String>,
    pub title: String,
    /// Cheapest current price across stores, USD.
    pub cheapest_price: f64,
}

/// One store's current offer inside a price comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOffer {
    pub store_name: String,
    pub price: f64,
    pub retail_price: f64,
    pub savings_percent: f64,
}

/// Per-title price comparison: current offers plus the historical floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceComparison {
    pub game_id: String,
    pub title: String,
    /// Lowest price ever recorded, USD.
    #[serde(default)]
    pub cheapest_ever: Option<f64>,
    #[serde(default)]
    pub cheapest_ever_date: Option<String>,
    pub offers: Vec<StoreOffer>,
}

/// A store known to the comparison service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// A listing from the curated store or the bundle store's shop. Prices USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedGame {
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_free: bool,
}

/// A game listed inside a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleGame {
    pub title: String,
}

/// A currently running bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub games: Vec<BundleGame>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_filters_top_rated() {
        let f = DealFilters::top_rated();
        assert_eq!(f.sort_by.as_deref(), Some("Deal Rating"));
        assert!(f.descending);
        assert!(f.on_sale);
    }

    #[test]
    fn deal_filters_free_only() {
        let f = DealFilters::free_only();
        assert_eq!(f.upper_price, Some(0.0));
        assert_eq!(f.lower_price, Some(0.0));
        assert!(!f.on_sale);
    }

    #[test]
    fn game_detail_tolerates_sparse_json() {
        let detail: GameDetail =
            serde_json::from_str(r#"{"external_id":"440","title":"Team Fortress 2"}"#).unwrap();
        assert!(detail.final_price.is_none());
        assert!(detail.genres.is_empty());
        assert!(!detail.is_free);
    }
}
