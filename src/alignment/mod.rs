// Party alignment
//
// Local, deterministic half of the simulator: swipe history in, ranked
// real-party matches out. No I/O and no failure modes.

pub mod aggregate;
pub mod parties;
pub mod score;
pub mod stance;

pub use aggregate::{aggregate_decisions, CategoryStances};
pub use parties::{PartyStanceTable, RealParty, DEFAULT_PARTY_STANCE};
pub use score::{aggregate_and_score, match_credit, score_parties, AlignmentResult, NEUTRAL_PRIOR_SCORE};
pub use stance::{Decision, Stance};
