// Stances and swipe decisions
//
// A swipe is what the user did on a card; a stance is the position that swipe
// expresses on the card's category. Party tables are written in stances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position on a topical category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Support,
    Oppose,
    Neutral,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Support => "support",
            Stance::Oppose => "oppose",
            Stance::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed swipe on a news card.
///
/// Older clients sent raw swipe directions instead of the decision name:
/// `right` = support, `left` = oppose, `up` = neutral. Both spellings are
/// accepted on input; output always uses the decision name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[serde(alias = "right")]
    Support,
    #[serde(alias = "left")]
    Oppose,
    #[serde(alias = "up")]
    Neutral,
}

impl Decision {
    /// Stance expressed by this swipe
    pub fn stance(self) -> Stance {
        match self {
            Decision::Support => Stance::Support,
            Decision::Oppose => Stance::Oppose,
            Decision::Neutral => Stance::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.stance().as_str()
    }
}

impl From<Decision> for Stance {
    fn from(decision: Decision) -> Self {
        decision.stance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_maps_to_same_named_stance() {
        assert_eq!(Decision::Support.stance(), Stance::Support);
        assert_eq!(Decision::Oppose.stance(), Stance::Oppose);
        assert_eq!(Decision::Neutral.stance(), Stance::Neutral);
    }

    #[test]
    fn test_legacy_swipe_directions_deserialize() {
        let decisions: Vec<Decision> =
            serde_json::from_str(r#"["right", "left", "up", "support"]"#).unwrap();
        assert_eq!(
            decisions,
            vec![
                Decision::Support,
                Decision::Oppose,
                Decision::Neutral,
                Decision::Support
            ]
        );
    }

    #[test]
    fn test_decision_serializes_by_name() {
        let json = serde_json::to_string(&Decision::Oppose).unwrap();
        assert_eq!(json, "\"oppose\"");
    }

    #[test]
    fn test_unknown_decision_rejected() {
        assert!(serde_json::from_str::<Decision>("\"down\"").is_err());
    }
}
