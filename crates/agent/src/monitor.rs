//! The recurring monitoring cycle.
//!
//! Each iteration refreshes the market snapshots, then walks the
//! watchlist serially with a courtesy delay between storefront detail
//! requests. Price drops against the last believed price become trend
//! events. One iteration never aborts the loop: gateways degrade to
//! empty results and a missing detail just skips that entry.

use std::sync::Arc;
use std::time::Duration;

use priceowl_config::MonitorConfig;
use priceowl_core::event::TrendEvent;
use priceowl_core::game::Storefront;
use priceowl_core::store::{ComparisonService, PrimaryStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::beliefs::{BeliefStore, PricingUpdate};

/// A handle to a running monitoring task.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal shutdown and wait for the task to finish its current step.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Runs monitoring iterations against the primary and comparison gateways.
pub struct Monitor {
    primary: Arc<dyn PrimaryStore>,
    comparison: Arc<dyn ComparisonService>,
    beliefs: Arc<BeliefStore>,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        comparison: Arc<dyn ComparisonService>,
        beliefs: Arc<BeliefStore>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            primary,
            comparison,
            beliefs,
            config,
        }
    }

    /// Spawn the recurring loop. The first iteration runs immediately.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> MonitorHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let monitor = Arc::clone(self);

        let task = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "monitoring started");
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                monitor.run_once().await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("monitoring stopped");
        });

        MonitorHandle { shutdown, task }
    }

    /// One full monitoring iteration.
    pub async fn run_once(&self) {
        let specials = self.primary.specials(self.config.specials_limit).await;
        if !specials.is_empty() {
            debug!(count = specials.len(), "specials snapshot updated");
            self.beliefs.set_specials(specials).await;
        }

        let deals = self
            .comparison
            .top_deals(self.config.top_deals_limit)
            .await;
        if !deals.is_empty() {
            debug!(count = deals.len(), "top deals snapshot updated");
            self.beliefs.set_top_deals(deals).await;
        }

        self.refresh_watchlist().await;
        self.beliefs.touch_refreshed().await;
    }

    /// Refresh prices for every tracked primary-storefront entry.
    ///
    /// Serial on purpose; the courtesy delay keeps the request rate low.
    pub async fn refresh_watchlist(&self) {
        for game in self.beliefs.watchlist().await {
            if !game.is_tracked || game.source != Storefront::Steam {
                continue;
            }
            let Some(external_id) = game.external_id.as_deref() else {
                continue;
            };

            tokio::time::sleep(Duration::from_secs(self.config.courtesy_delay_secs)).await;

            let Some(detail) = self.primary.detail(external_id).await else {
                continue;
            };
            let Some(final_minor) = detail.final_price else {
                continue;
            };

            // Storefront prices arrive in minor units
            let new_price = final_minor as f64 / 100.0;

            if let Some(old_price) = game.current_price
                && new_price < old_price
            {
                let event = TrendEvent::price_drop(
                    game.id.clone(),
                    format!("📉 Цена на {} снизилась!", game.title),
                    format!(
                        "Было: {old_price:.2} {cur} → Стало: {new_price:.2} {cur}",
                        cur = game.currency
                    ),
                );
                info!(game = %game.title, old_price, new_price, "price drop detected");
                self.beliefs.record_event(event).await;
            }

            let original_price = detail.initial_price.map(|p| p as f64 / 100.0);
            self.beliefs
                .apply_pricing(
                    &game.id,
                    PricingUpdate {
                        current_price: new_price,
                        discount_percent: detail.discount_percent,
                        original_price,
                        detail,
                    },
                )
                .await;
        }
    }
}
