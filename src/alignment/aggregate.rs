// Decision aggregation
//
// Collapses a session's swipe history into one stance per category.

use std::collections::HashMap;

use super::stance::Stance;
use crate::news::{index_by_id, NewsItem, UserDecision};

/// Category -> the user's latest stance on it
pub type CategoryStances = HashMap<String, Stance>;

/// Reduce `decisions` to one stance per category.
///
/// Later decisions overwrite earlier ones on the same category (sequence
/// order, not timestamp). Decisions whose news item is not in `news` are
/// skipped.
pub fn aggregate_decisions(decisions: &[UserDecision], news: &[NewsItem]) -> CategoryStances {
    let index = index_by_id(news);
    let mut stances = CategoryStances::new();

    for decision in decisions {
        let Some(item) = index.get(decision.news_id.as_str()) else {
            tracing::debug!(news_id = %decision.news_id, "Skipping decision for unknown news item");
            continue;
        };
        stances.insert(item.category.clone(), decision.decision.stance());
    }

    stances
}
