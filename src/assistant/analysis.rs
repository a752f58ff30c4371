// Narrative analysis of a decision history

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::parse::{parse_analysis_reply, AnalysisResult};
use super::AssistantTarget;
use crate::alignment::Decision;
use crate::errors::AssistantError;
use crate::news::{index_by_id, NewsItem, UserDecision};

const UNKNOWN_TITLE: &str = "Unknown";
const NO_SUMMARY: &str = "No summary available";

/// What the agent sees of one decision. Ids and timestamps stay local.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedDecision<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub user_response: Decision,
}

/// Pair each decision with its news context, in decision order.
///
/// A decision whose news item is missing is still sent, with placeholder
/// title and summary, so the agent sees the full history.
pub fn format_decisions<'a>(
    decisions: &'a [UserDecision],
    news: &'a [NewsItem],
) -> Vec<FormattedDecision<'a>> {
    let index = index_by_id(news);
    decisions
        .iter()
        .map(|decision| {
            let item = index.get(decision.news_id.as_str());
            FormattedDecision {
                title: item
                    .map(|i| i.title.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or(UNKNOWN_TITLE),
                summary: item
                    .map(|i| i.summary.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(NO_SUMMARY),
                user_response: decision.decision,
            }
        })
        .collect()
}

/// Turns a decision history into an [`AnalysisResult`] via the analysis agent
#[derive(Clone)]
pub struct AnalysisService {
    target: AssistantTarget,
}

impl AnalysisService {
    pub fn new(target: AssistantTarget) -> Self {
        Self { target }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_ready()
    }

    /// Ask the analysis agent to explain `decisions`.
    ///
    /// An empty history is rejected before anything else, including the
    /// configuration check.
    pub async fn request_analysis(
        &self,
        decisions: &[UserDecision],
        news: &[NewsItem],
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AssistantError> {
        if decisions.is_empty() {
            return Err(AssistantError::EmptyDecisions);
        }

        let formatted = format_decisions(decisions, news);
        let message = serde_json::to_string_pretty(&formatted)?;

        let reply = self.target.run(&message, cancel).await.map_err(|e| {
            if !e.is_not_configured() {
                tracing::error!(error = %e, decisions = decisions.len(), "Analysis request failed");
            }
            e
        })?;

        let result = parse_analysis_reply(&reply);
        tracing::info!(
            decisions = decisions.len(),
            raw_fallback = result.is_raw_fallback(),
            "Analysis complete"
        );
        Ok(result)
    }
}
