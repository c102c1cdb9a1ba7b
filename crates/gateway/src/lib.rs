//! HTTP API gateway for PriceOwl.
//!
//! A thin axum shim over [`DealAgent`]: every handler validates its query
//! parameters and delegates. Endpoints:
//!
//! - `GET  /health`          — liveness + provider availability
//! - `GET  /watchlist`       — the tracked games
//! - `POST /watchlist`       — upsert entries, refresh, echo the list
//! - `GET  /events`          — recent trend events
//! - `POST /chat`            — conversation in, reply + events out
//! - `GET  /search`          — primary storefront title search
//! - `GET  /game/{app_id}`   — full storefront detail
//! - `GET  /deals/steam`     — storefront specials
//! - `GET  /deals/featured`  — storefront featured items
//! - `GET  /deals/top`       — best-rated cross-store deals
//! - `GET  /deals/all`       — filtered cross-store deals
//! - `GET  /deals/free`      — zero-price items
//! - `GET  /compare`         — per-title price comparison
//! - `GET  /stores`          — stores known to the comparison service
//!
//! Invalid query parameters return 400; upstream failures degrade to
//! empty lists or null, matching the gateway contract.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use priceowl_agent::DealAgent;
use priceowl_core::catalog::{
    Deal, DealFilters, GameDetail, PriceComparison, SearchHit, Special, StoreInfo,
};
use priceowl_core::event::TrendEvent;
use priceowl_core::game::Game;
use priceowl_core::message::{ChatMessage, ChatResponse};

type SharedAgent = Arc<DealAgent>;

/// Build the router with all gateway routes.
///
/// CORS is fully permissive: the service fronts a browser client served
/// from an arbitrary origin.
pub fn build_router(agent: SharedAgent) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/watchlist", get(get_watchlist_handler))
        .route("/watchlist", post(update_watchlist_handler))
        .route("/events", get(events_handler))
        .route("/chat", post(chat_handler))
        .route("/search", get(search_handler))
        .route("/game/{app_id}", get(game_detail_handler))
        .route("/deals/steam", get(steam_deals_handler))
        .route("/deals/featured", get(featured_handler))
        .route("/deals/top", get(top_deals_handler))
        .route("/deals/all", get(all_deals_handler))
        .route("/deals/free", get(free_deals_handler))
        .route("/compare", get(compare_handler))
        .route("/stores", get(stores_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(agent)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    ai_available: bool,
}

#[derive(Serialize, Deserialize)]
struct WatchlistResponse {
    games: Vec<Game>,
}

#[derive(Deserialize)]
struct WatchlistUpdateRequest {
    games: Vec<Game>,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    history: Vec<ChatMessage>,
    user_message: String,
}

#[derive(Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct AllDealsQuery {
    store: Option<String>,
    max_price: Option<f64>,
    min_metacritic: Option<i64>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct CompareQuery {
    title: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn checked_limit(limit: Option<usize>, default: usize, max: usize) -> Result<usize, ApiError> {
    let limit = limit.unwrap_or(default);
    if limit == 0 || limit > max {
        return Err(bad_request(format!("limit must be within 1..={max}")));
    }
    Ok(limit)
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler(State(agent): State<SharedAgent>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        ai_available: agent.provider_available(),
    })
}

async fn get_watchlist_handler(State(agent): State<SharedAgent>) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        games: agent.watchlist().await,
    })
}

async fn update_watchlist_handler(
    State(agent): State<SharedAgent>,
    Json(req): Json<WatchlistUpdateRequest>,
) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        games: agent.apply_watchlist(req.games).await,
    })
}

async fn events_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<TrendEvent>> {
    let limit = query.limit.unwrap_or_else(|| agent.events_limit());
    Json(agent.recent_events(limit).await)
}

async fn chat_handler(
    State(agent): State<SharedAgent>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let mut messages = req.history;
    messages.push(ChatMessage::user(req.user_message));
    Json(agent.chat(&messages).await)
}

async fn search_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    if query.q.chars().count() < 2 {
        return Err(bad_request("q must be at least 2 characters"));
    }
    let limit = checked_limit(query.limit, 10, 25)?;
    Ok(Json(agent.search_games(&query.q, limit).await))
}

async fn game_detail_handler(
    State(agent): State<SharedAgent>,
    Path(app_id): Path<String>,
) -> Json<Option<GameDetail>> {
    Json(agent.game_detail(&app_id).await)
}

async fn steam_deals_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Special>>, ApiError> {
    let limit = checked_limit(query.limit, 20, 50)?;
    Ok(Json(agent.specials(limit).await))
}

async fn featured_handler(State(agent): State<SharedAgent>) -> Json<Vec<Special>> {
    Json(agent.featured(20).await)
}

async fn top_deals_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let limit = checked_limit(query.limit, 15, 30)?;
    Ok(Json(agent.top_deals(limit).await))
}

async fn all_deals_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<AllDealsQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let limit = checked_limit(query.limit, 20, 50)?;
    let filters = DealFilters {
        store_id: query.store,
        upper_price: query.max_price,
        min_metacritic: query.min_metacritic,
        ..DealFilters::default()
    };
    Ok(Json(agent.deals(&filters, limit).await))
}

async fn free_deals_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let limit = checked_limit(query.limit, 10, 20)?;
    Ok(Json(agent.free_games(limit).await))
}

async fn compare_handler(
    State(agent): State<SharedAgent>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Option<PriceComparison>>, ApiError> {
    if query.title.chars().count() < 2 {
        return Err(bad_request("title must be at least 2 characters"));
    }
    Ok(Json(agent.compare_prices(&query.title).await))
}

async fn stores_handler(State(agent): State<SharedAgent>) -> Json<Vec<StoreInfo>> {
    Json(agent.stores().await)
}
