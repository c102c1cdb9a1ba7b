//! Keyword-based intent classification for user utterances.
//!
//! Pure functions over lowercase substring matching. The keyword table
//! carries the Russian stems the agent's audience actually types plus
//! their English counterparts. An utterance can match several intents;
//! [`classify`] returns them in fixed branch-priority order.

/// A context branch the assembler knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Deals,
    FreeGames,
    Bundles,
    Compare,
    Search,
    Classic,
}

/// Branch priority order. The assembler walks matched intents in exactly
/// this order.
const BRANCH_ORDER: [Intent; 6] = [
    Intent::Deals,
    Intent::FreeGames,
    Intent::Bundles,
    Intent::Compare,
    Intent::Search,
    Intent::Classic,
];

fn keywords(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Deals => &[
            "скидк",
            "распродаж",
            "акци",
            "дешев",
            "предложен",
            "что интересного",
            "что посоветуешь",
            "deal",
            "sale",
            "discount",
        ],
        Intent::FreeGames => &["бесплатн", "халява", "free"],
        Intent::Bundles => &[
            "бандл",
            "bundle",
            "что интересного",
            "что посоветуешь",
        ],
        Intent::Compare => &["сравн", "где купить", "дешевле", "лучше купить"],
        Intent::Search => &["найд", "поиск", "ищу", "search", "find"],
        Intent::Classic => &[
            "классик",
            "старые",
            "ретро",
            "old school",
            "ностальгия",
        ],
    }
}

/// Classify an utterance into zero or more intents, in branch order.
pub fn classify(utterance: &str) -> Vec<Intent> {
    let lower = utterance.to_lowercase();
    BRANCH_ORDER
        .into_iter()
        .filter(|intent| keywords(*intent).iter().any(|kw| lower.contains(kw)))
        .collect()
}

/// Trigger phrases stripped first when extracting a comparison title.
const COMPARE_PHRASES: [&str; 5] = [
    "сравнить цены на",
    "сравни цены на",
    "где купить",
    "где дешевле",
    "лучше купить",
];

/// Single marker words; the title is whatever follows the first match.
const COMPARE_MARKERS: [&str; 4] = ["где", "лучше", "дешевле", "купить"];

/// Extract the game title from a comparison request.
///
/// Strips the first matching trigger phrase; failing that, takes the text
/// after the first marker word; failing that, the whole utterance.
/// Lowercased and trimmed.
pub fn extract_compare_title(utterance: &str) -> String {
    let lower = utterance.to_lowercase();

    for phrase in COMPARE_PHRASES {
        if lower.contains(phrase) {
            return lower.replacen(phrase, "", 1).trim().to_string();
        }
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        if COMPARE_MARKERS.contains(word) && i + 1 < words.len() {
            return words[i + 1..].join(" ");
        }
    }

    lower.trim().to_string()
}

const SEARCH_TRIGGERS: [&str; 6] = ["найти", "найди", "поиск", "ищу", "search", "find"];

/// Strip search trigger words from an utterance, keeping the rest intact.
pub fn extract_search_query(utterance: &str) -> String {
    utterance
        .split_whitespace()
        .filter(|word| !SEARCH_TRIGGERS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_request_matches_search_only() {
        assert_eq!(classify("найди Half-Life"), vec![Intent::Search]);
    }

    #[test]
    fn deals_request_matches_deals() {
        assert_eq!(classify("любые скидки?"), vec![Intent::Deals]);
    }

    #[test]
    fn compare_request_matches_compare() {
        let intents = classify("сравни цены на Portal");
        assert_eq!(intents, vec![Intent::Compare]);
    }

    #[test]
    fn cheaper_matches_both_deals_and_compare_in_branch_order() {
        // "дешевле" contains the deals stem "дешев"
        assert_eq!(
            classify("где дешевле купить игру"),
            vec![Intent::Deals, Intent::Compare]
        );
    }

    #[test]
    fn recommendation_request_matches_deals_and_bundles() {
        assert_eq!(
            classify("что посоветуешь?"),
            vec![Intent::Deals, Intent::Bundles]
        );
    }

    #[test]
    fn unrelated_text_matches_nothing() {
        assert!(classify("привет, как дела").is_empty());
    }

    #[test]
    fn compare_title_strips_trigger_phrase() {
        assert_eq!(extract_compare_title("сравни цены на Portal"), "portal");
        assert_eq!(
            extract_compare_title("Сравнить цены на Hollow Knight"),
            "hollow knight"
        );
    }

    #[test]
    fn compare_title_falls_back_to_marker_words() {
        assert_eq!(extract_compare_title("дешевле Terraria"), "terraria");
    }

    #[test]
    fn compare_title_falls_back_to_whole_utterance() {
        assert_eq!(extract_compare_title("Portal 2"), "portal 2");
    }

    #[test]
    fn search_query_strips_trigger_words() {
        assert_eq!(extract_search_query("найди Half-Life"), "Half-Life");
        assert_eq!(extract_search_query("поиск Stardew Valley"), "Stardew Valley");
        assert_eq!(extract_search_query("ищу Portal"), "Portal");
    }
}
