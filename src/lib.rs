// partysim - party alignment simulator
// Library exports

pub mod alignment;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod errors;
pub mod news;
pub mod providers;
pub mod server;

pub use alignment::{aggregate_and_score, AlignmentResult, PartyStanceTable, RealParty, Stance};
pub use assistant::{AnalysisResult, Assistants, RewriteOutcome};
pub use config::Config;
pub use errors::AssistantError;
pub use news::{NewsItem, UserDecision};
