//! Context assembly: turning an utterance into a market-data digest.
//!
//! Each matched intent fills one section from its gateway; the watchlist
//! section always comes last. Gateways already swallow their own failures,
//! so every sub-fetch here is failure-isolated and the assembler itself
//! never returns an error. An all-empty result yields a fixed placeholder
//! that tells the model there is nothing to cite.

use std::sync::Arc;

use priceowl_core::event::TrendEvent;
use priceowl_core::store::{BundleStore, ComparisonService, CuratedStore, PrimaryStore};

use crate::beliefs::BeliefStore;
use crate::intent::{self, Intent, classify};

pub(crate) const NO_DATA_PLACEHOLDER: &str =
    "Нет данных. Предложи пользователю добавить игры в мониторинг или задать вопрос о скидках.";

/// Assembles the chat context from live gateway data plus beliefs.
pub struct ContextAssembler {
    primary: Arc<dyn PrimaryStore>,
    comparison: Arc<dyn ComparisonService>,
    curated: Arc<dyn CuratedStore>,
    bundles: Arc<dyn BundleStore>,
    beliefs: Arc<BeliefStore>,
}

/// Prices from the primary storefront are minor units, but a few upstream
/// feeds already report majors. Values above 1000 are taken as minor.
fn heuristic_major(value: i64) -> f64 {
    if value > 1000 {
        value as f64 / 100.0
    } else {
        value as f64
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

impl ContextAssembler {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        comparison: Arc<dyn ComparisonService>,
        curated: Arc<dyn CuratedStore>,
        bundles: Arc<dyn BundleStore>,
        beliefs: Arc<BeliefStore>,
    ) -> Self {
        Self {
            primary,
            comparison,
            curated,
            bundles,
            beliefs,
        }
    }

    /// Build the context block for one utterance.
    ///
    /// Returns the assembled text plus the events it surfaced (currently
    /// always empty; the event log is served separately).
    pub async fn assemble(&self, user_message: &str) -> (String, Vec<TrendEvent>) {
        let mut intents = classify(user_message);
        if intents.is_empty() {
            // No recognizable request: show the general market picture
            intents = vec![Intent::Deals, Intent::Bundles];
        }

        let mut parts: Vec<String> = Vec::new();
        // The bundle listing can be wanted by two branches; emit it once.
        let mut bundles_shown = false;

        for intent in intents {
            match intent {
                Intent::Deals => self.add_deals(&mut parts).await,
                Intent::FreeGames => {
                    self.add_free_games(&mut parts).await;
                    self.add_bundle_listing(&mut parts, &mut bundles_shown).await;
                }
                Intent::Bundles => {
                    self.add_bundle_listing(&mut parts, &mut bundles_shown).await;
                    self.add_bundle_store_deals(&mut parts).await;
                }
                Intent::Compare => self.add_comparison(&mut parts, user_message).await,
                Intent::Search => self.add_search(&mut parts, user_message).await,
                Intent::Classic => self.add_classics(&mut parts).await,
            }
        }

        self.add_watchlist(&mut parts).await;

        let returned_events = Vec::new();
        if parts.is_empty() {
            (NO_DATA_PLACEHOLDER.to_string(), returned_events)
        } else {
            (parts.join("\n"), returned_events)
        }
    }

    async fn add_deals(&self, parts: &mut Vec<String>) {
        let specials = self.primary.specials(15).await;
        if !specials.is_empty() {
            parts.push("\n🔥 Текущие скидки в Steam:".into());
            for s in specials.iter().take(10) {
                let final_fmt = heuristic_major(s.final_price.unwrap_or(0));
                let original_fmt = heuristic_major(s.original_price.unwrap_or(0));
                let discount = s.discount_percent.unwrap_or(0.0);
                parts.push(format!(
                    "- {}: {final_fmt:.2} ₽ (было {original_fmt:.2} ₽, скидка {discount:.0}%)",
                    s.title
                ));
            }
        }

        let deals = self.comparison.top_deals(15).await;
        if !deals.is_empty() {
            parts.push("\n💰 Лучшие скидки на всех площадках:".into());
            for d in deals.iter().take(15) {
                parts.push(format!(
                    "- {}: ${:.2} (было ${:.2}, скидка {:.0}%) в {}",
                    d.title, d.sale_price, d.normal_price, d.savings_percent, d.store_name
                ));
            }
        }
    }

    async fn add_free_games(&self, parts: &mut Vec<String>) {
        let specials = self.primary.specials(20).await;
        let free: Vec<_> = specials
            .iter()
            .filter(|s| s.final_price.unwrap_or(0) == 0)
            .take(5)
            .collect();
        if !free.is_empty() {
            parts.push("\n🆓 Бесплатные игры в Steam:".into());
            for s in free {
                parts.push(format!("- {}", s.title));
            }
        }

        let deals = self.comparison.top_deals(15).await;
        let almost_free: Vec<_> = deals
            .iter()
            .filter(|d| d.sale_price <= 1.0)
            .take(8)
            .collect();
        if !almost_free.is_empty() {
            parts.push("\n🆓 Почти бесплатные игры (до $1):".into());
            for d in almost_free {
                parts.push(format!(
                    "- {}: ${:.2} в {}",
                    d.title, d.sale_price, d.store_name
                ));
            }
        }
    }

    async fn add_bundle_listing(&self, parts: &mut Vec<String>, shown: &mut bool) {
        if *shown {
            return;
        }
        let bundles = self.bundles.current_bundles().await;
        if bundles.is_empty() {
            return;
        }
        *shown = true;
        parts.push("\n🎁 Текущие бандлы Humble Bundle:".into());
        for bundle in bundles.iter().take(3) {
            let preview: Vec<&str> = bundle
                .games
                .iter()
                .take(3)
                .map(|g| g.title.as_str())
                .collect();
            parts.push(format!("- {}: {}", bundle.title, preview.join(", ")));
        }
    }

    async fn add_bundle_store_deals(&self, parts: &mut Vec<String>) {
        let deals = self.bundles.store_deals(5).await;
        if deals.is_empty() {
            return;
        }
        parts.push("\n🛒 Скидки в Humble Store:".into());
        for g in deals.iter().take(5) {
            parts.push(format!(
                "- {}: ${:.2} (было ${:.2}, скидка {:.0}%)",
                g.title,
                g.price.unwrap_or(0.0),
                g.original_price.unwrap_or(0.0),
                g.discount_percent.unwrap_or(0.0)
            ));
        }
    }

    async fn add_comparison(&self, parts: &mut Vec<String>, user_message: &str) {
        let title = intent::extract_compare_title(user_message);
        if title.chars().count() <= 2 {
            return;
        }

        let hits = self.comparison.search(&title, 5).await;
        if !hits.is_empty() {
            parts.push("\n🔍 Найдены магазины для игры:".into());
            for hit in hits.iter().take(3) {
                parts.push(format!("- {}: ${:.2}", hit.title, hit.cheapest_price));
            }
        } else {
            let humble_hits = self.bundles.search(&title).await;
            if !humble_hits.is_empty() {
                parts.push("\n🔍 Найдены магазины для игры:".into());
                for g in humble_hits.iter().take(3) {
                    match g.price {
                        Some(price) if price > 0.0 => {
                            parts.push(format!("- {}: ${price:.2} в Humble Store", g.title));
                        }
                        _ => parts.push(format!("- {}: Бесплатно в Humble Store", g.title)),
                    }
                }
            }
        }

        let comparison = match hits.first() {
            Some(hit) => self.comparison.game_detail(&hit.game_id).await,
            None => None,
        };
        if let Some(comp) = comparison
            && !comp.offers.is_empty()
        {
            parts.push(format!("\n🔍 Сравнение цен на {}:", comp.title));
            for offer in comp.offers.iter().take(5) {
                parts.push(format!(
                    "- {}: ${:.2} (-{:.0}%)",
                    offer.store_name, offer.price, offer.savings_percent
                ));
            }
            if let Some(floor) = comp.cheapest_ever {
                parts.push(format!("📉 Исторический минимум: ${floor:.2}"));
            }
        }
    }

    async fn add_search(&self, parts: &mut Vec<String>, user_message: &str) {
        let query = intent::extract_search_query(user_message);
        if query.chars().count() <= 2 {
            return;
        }
        let hits = self.primary.search(&query, 10).await;
        if hits.is_empty() {
            return;
        }
        parts.push(format!("\n🔎 Результаты поиска '{query}':"));
        for hit in hits.iter().take(5) {
            parts.push(format!(
                "- {}: {}",
                hit.title,
                hit.price_formatted.as_deref().unwrap_or("Бесплатно")
            ));
        }
    }

    async fn add_classics(&self, parts: &mut Vec<String>) {
        let classics = self.curated.classics(10).await;
        if classics.is_empty() {
            return;
        }
        parts.push("\n🕹️ Классические игры в GOG:".into());
        for g in classics.iter().take(5) {
            let price = match g.price {
                Some(p) if p > 0.0 => {
                    format!(" - {p:.2} {}", g.currency.as_deref().unwrap_or("USD"))
                }
                _ => " - Бесплатно".to_string(),
            };
            let genres = if g.genres.is_empty() {
                String::new()
            } else {
                let tags: Vec<&str> = g.genres.iter().take(2).map(String::as_str).collect();
                format!(" [{}]", tags.join(", "))
            };
            parts.push(format!("- {}{price}{genres}", g.title));
        }
    }

    async fn add_watchlist(&self, parts: &mut Vec<String>) {
        let watchlist = self.beliefs.watchlist().await;
        let tracked: Vec<_> = watchlist.iter().filter(|g| g.is_tracked).collect();
        if tracked.is_empty() {
            return;
        }
        parts.push("\n📋 Твои отслеживаемые игры:".into());
        for g in tracked {
            let price = match g.current_price {
                Some(p) => format!("{p:.2} {}", g.currency),
                None => "цена неизвестна".to_string(),
            };
            let disc = match g.discount_percent {
                Some(d) => format!(" (-{d:.0}%)"),
                None => String::new(),
            };
            parts.push(format!("- {}: {price}{disc}", g.title));

            if let Some(detail) = &g.detail {
                if let Some(desc) = &detail.short_description {
                    let desc = if desc.chars().count() > 50 {
                        truncate_chars(desc, 200)
                    } else {
                        desc.clone()
                    };
                    if !desc.is_empty() {
                        parts.push(format!("  📝 {desc}"));
                    }
                }
                if !detail.genres.is_empty() {
                    let genres: Vec<&str> =
                        detail.genres.iter().take(3).map(String::as_str).collect();
                    parts.push(format!("  🎮 {}", genres.join(", ")));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use priceowl_core::game::Game;

    fn assembler_with(
        primary: MockPrimary,
        comparison: MockComparison,
        curated: MockCurated,
        bundles: MockBundles,
    ) -> (ContextAssembler, Arc<BeliefStore>) {
        let beliefs = Arc::new(BeliefStore::new());
        let assembler = ContextAssembler::new(
            Arc::new(primary),
            Arc::new(comparison),
            Arc::new(curated),
            Arc::new(bundles),
            beliefs.clone(),
        );
        (assembler, beliefs)
    }

    #[tokio::test]
    async fn all_empty_gateways_yield_placeholder() {
        let (assembler, _) = assembler_with(
            MockPrimary::default(),
            MockComparison::default(),
            MockCurated::default(),
            MockBundles::default(),
        );
        let (context, events) = assembler.assemble("любые скидки?").await;
        assert_eq!(context, NO_DATA_PLACEHOLDER);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn search_request_fills_only_the_search_section() {
        let primary = MockPrimary {
            search_hits: vec![search_hit("70", "Half-Life", Some("199 ₽"))],
            specials: vec![special("10", "Counter-Strike", Some(4999), Some(49900), 90.0)],
            ..Default::default()
        };
        let (assembler, _) = assembler_with(
            primary,
            MockComparison::default(),
            MockCurated::default(),
            MockBundles::default(),
        );

        let (context, _) = assembler.assemble("найди Half-Life").await;
        assert!(context.contains("🔎 Результаты поиска 'Half-Life':"));
        assert!(context.contains("- Half-Life: 199 ₽"));
        assert!(!context.contains("🔥"));
    }

    #[tokio::test]
    async fn compare_request_extracts_title_and_compares() {
        let comparison = MockComparison {
            hits: vec![comparison_hit("612", "Portal", 1.99)],
            comparison: Some(price_comparison(
                "612",
                "Portal",
                Some(0.71),
                vec![offer("Steam", 1.99, 9.99, 80.0)],
            )),
            ..Default::default()
        };
        let (assembler, _) = assembler_with(
            MockPrimary::default(),
            comparison,
            MockCurated::default(),
            MockBundles::default(),
        );

        let (context, _) = assembler.assemble("сравни цены на Portal").await;
        assert!(context.contains("🔍 Найдены магазины для игры:"));
        assert!(context.contains("🔍 Сравнение цен на Portal:"));
        assert!(context.contains("- Steam: $1.99 (-80%)"));
        assert!(context.contains("📉 Исторический минимум: $0.71"));
    }

    #[tokio::test]
    async fn unmatched_utterance_falls_back_to_deals_and_bundles() {
        let primary = MockPrimary {
            specials: vec![special("10", "Counter-Strike", Some(4999), Some(49900), 90.0)],
            ..Default::default()
        };
        let bundles = MockBundles {
            bundles: vec![bundle("Indie Bundle", &["Celeste", "Hades", "Tunic", "Fez"])],
            ..Default::default()
        };
        let (assembler, _) = assembler_with(
            primary,
            MockComparison::default(),
            MockCurated::default(),
            bundles,
        );

        let (context, _) = assembler.assemble("привет").await;
        assert!(context.contains("🔥 Текущие скидки в Steam:"));
        // Minor units, two decimals
        assert!(context.contains("- Counter-Strike: 49.99 ₽ (было 499.00 ₽, скидка 90%)"));
        assert!(context.contains("🎁 Текущие бандлы Humble Bundle:"));
        // Only the first three constituents are listed
        assert!(context.contains("- Indie Bundle: Celeste, Hades, Tunic"));
        assert!(!context.contains("Fez"));
    }

    #[tokio::test]
    async fn bundle_listing_is_emitted_at_most_once() {
        let bundles = MockBundles {
            bundles: vec![bundle("Indie Bundle", &["Celeste"])],
            ..Default::default()
        };
        let (assembler, _) = assembler_with(
            MockPrimary::default(),
            MockComparison::default(),
            MockCurated::default(),
            bundles,
        );

        // Matches both the free-games and the bundles branch
        let (context, _) = assembler.assemble("бесплатные бандлы").await;
        assert_eq!(context.matches("🎁 Текущие бандлы Humble Bundle:").count(), 1);
    }

    #[tokio::test]
    async fn watchlist_section_lists_tracked_games_with_detail() {
        let (assembler, beliefs) = assembler_with(
            MockPrimary::default(),
            MockComparison::default(),
            MockCurated::default(),
            MockBundles::default(),
        );

        let mut game = Game::new("g1", "Portal 2").with_external_id("620");
        game.current_price = Some(149.0);
        game.discount_percent = Some(75.0);
        game.detail = Some(game_detail(
            "620",
            "Portal 2",
            Some(14900),
            vec!["Puzzle".into(), "Co-op".into()],
        ));
        let mut hidden = Game::new("g2", "Hidden");
        hidden.is_tracked = false;
        beliefs.replace_watchlist(vec![game, hidden]).await;

        let (context, _) = assembler.assemble("что там с моими играми").await;
        assert!(context.contains("📋 Твои отслеживаемые игры:"));
        assert!(context.contains("- Portal 2: 149.00 RUB (-75%)"));
        assert!(context.contains("🎮 Puzzle, Co-op"));
        assert!(!context.contains("Hidden"));
    }

    #[tokio::test]
    async fn near_free_deals_appear_in_free_section() {
        let comparison = MockComparison {
            deals: vec![
                deal("Cheap Gem", 0.99, 9.99, 90.0, "Fanatical"),
                deal("Full Price", 29.99, 29.99, 0.0, "Steam"),
            ],
            ..Default::default()
        };
        let (assembler, _) = assembler_with(
            MockPrimary::default(),
            comparison,
            MockCurated::default(),
            MockBundles::default(),
        );

        let (context, _) = assembler.assemble("есть халява?").await;
        assert!(context.contains("🆓 Почти бесплатные игры (до $1):"));
        assert!(context.contains("- Cheap Gem: $0.99 в Fanatical"));
        assert!(!context.contains("Full Price"));
    }
}
