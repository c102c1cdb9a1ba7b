//! # PriceOwl Core
//!
//! Domain types, traits, and error definitions for the PriceOwl game-deals
//! agent. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (storefront, price aggregator, completion
//! provider) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod catalog;
pub mod error;
pub mod event;
pub mod game;
pub mod message;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use catalog::{
    Bundle, BundleGame, ComparisonHit, CuratedGame, Deal, DealFilters, GameDetail,
    PriceComparison, SearchHit, Special, StoreInfo, StoreOffer,
};
pub use error::{ProviderError, StoreError};
pub use event::{TrendEvent, TrendEventKind};
pub use game::{Game, Storefront};
pub use message::{ChatMessage, ChatResponse, Role};
pub use provider::CompletionProvider;
pub use store::{BundleStore, ComparisonService, CuratedStore, PrimaryStore};
