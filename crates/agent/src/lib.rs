//! The deal-watching agent — the heart of PriceOwl.
//!
//! The agent follows a **believe → monitor → respond** cycle:
//!
//! 1. **Beliefs** hold the watchlist, the trend event log and cached
//!    market snapshots ([`beliefs::BeliefStore`]).
//! 2. **Monitoring** periodically refreshes snapshots and watchlist
//!    prices, emitting price-drop events ([`monitor::Monitor`]).
//! 3. **Responding** classifies the user's utterance, assembles live
//!    market context for it and composes a reply, with an LLM when one
//!    is configured and a templated fallback otherwise.
//!
//! Everything is wired together by [`DealAgent`], a plain struct holding
//! its gateways as injected trait objects.

pub mod agent;
pub mod beliefs;
pub mod composer;
pub mod context;
pub mod intent;
pub mod monitor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use agent::DealAgent;
pub use beliefs::BeliefStore;
pub use composer::ResponseComposer;
pub use context::ContextAssembler;
pub use intent::{Intent, classify};
pub use monitor::{Monitor, MonitorHandle};
