// Alignment scoring
//
// Compares the user's per-category stances with each party's stance table
// and ranks parties by match percentage.

use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate_decisions, CategoryStances};
use super::parties::{PartyStanceTable, RealParty};
use super::stance::Stance;
use crate::news::{NewsItem, UserDecision};

/// Score every party gets when the user has no aggregated categories
pub const NEUTRAL_PRIOR_SCORE: u8 = 50;

const FULL_CREDIT: f64 = 1.0;
const PARTIAL_CREDIT: f64 = 0.5;
const NO_CREDIT: f64 = 0.0;

/// One party's match against the user, 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub party: RealParty,
    pub score: u8,
}

/// Credit for a single category comparison.
///
/// Equal stances match fully; if either side is neutral the match is
/// partial; support against oppose earns nothing.
pub fn match_credit(user: Stance, party: Stance) -> f64 {
    if user == party {
        FULL_CREDIT
    } else if user == Stance::Neutral || party == Stance::Neutral {
        PARTIAL_CREDIT
    } else {
        NO_CREDIT
    }
}

/// Score one party against the user's aggregated stances.
///
/// Only the user's categories are compared; categories the party defines but
/// the user never saw do not count.
pub fn score_party(user: &CategoryStances, party: &RealParty) -> u8 {
    if user.is_empty() {
        return NEUTRAL_PRIOR_SCORE;
    }

    let mut credit = 0.0;
    let mut compared = 0usize;
    for (category, stance) in user {
        credit += match_credit(*stance, party.stance_on(category));
        compared += 1;
    }

    let score = (credit / compared as f64 * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

/// Score every party and rank descending. Ties keep table order.
pub fn score_parties(user: &CategoryStances, table: &PartyStanceTable) -> Vec<AlignmentResult> {
    let mut results: Vec<AlignmentResult> = table
        .parties()
        .iter()
        .map(|party| AlignmentResult {
            party: party.clone(),
            score: score_party(user, party),
        })
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Aggregate a session's decisions and rank the table's parties against them
pub fn aggregate_and_score(
    decisions: &[UserDecision],
    news: &[NewsItem],
    table: &PartyStanceTable,
) -> Vec<AlignmentResult> {
    let stances = aggregate_decisions(decisions, news);
    tracing::debug!(
        decisions = decisions.len(),
        categories = stances.len(),
        "Scoring alignment"
    );
    score_parties(&stances, table)
}
