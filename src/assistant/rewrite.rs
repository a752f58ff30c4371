// News text rewriting
//
// Same conversation protocol as analysis, one plain string in and one out.
// Failures never surface as errors: the caller always gets text back.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::AssistantTarget;
use crate::errors::AssistantError;
use crate::news::NewsItem;

const MISSING_CREDENTIALS: &str = "Missing credentials";
const REWRITE_FAILED: &str = "Rewrite failed";
const REWRITE_CANCELLED: &str = "Rewrite cancelled";

/// Result of one rewrite. On failure `rewritten_text` is the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutcome {
    pub rewritten_text: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RewriteOutcome {
    fn rewritten(text: String) -> Self {
        Self {
            rewritten_text: text,
            success: true,
            error: None,
        }
    }

    fn unchanged(original: &str, reason: &str) -> Self {
        Self {
            rewritten_text: original.to_string(),
            success: false,
            error: Some(reason.to_string()),
        }
    }
}

/// A news item with its summary and role-play prompt rewritten where possible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewrittenNewsItem {
    #[serde(flatten)]
    pub item: NewsItem,
    pub summary_rewritten: bool,
    pub prompt_rewritten: bool,
}

#[derive(Clone)]
pub struct RewriteService {
    target: AssistantTarget,
    permits: Arc<Semaphore>,
}

impl RewriteService {
    /// `max_concurrent` bounds the provider conversations open at once
    /// across every clone of this service.
    pub fn new(target: AssistantTarget, max_concurrent: usize) -> Self {
        Self {
            target,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_ready()
    }

    pub async fn rewrite_text(&self, text: &str, cancel: &CancellationToken) -> RewriteOutcome {
        if !self.target.is_ready() {
            tracing::error!("Rewrite credentials not configured");
            return RewriteOutcome::unchanged(text, MISSING_CREDENTIALS);
        }

        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return RewriteOutcome::unchanged(text, REWRITE_CANCELLED),
            permit = self.permits.acquire() => match permit {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Rewrite permits unavailable");
                    return RewriteOutcome::unchanged(text, REWRITE_FAILED);
                }
            },
        };

        match self.target.run(text, cancel).await {
            Ok(reply) if !reply.trim().is_empty() => RewriteOutcome::rewritten(reply.trim().to_string()),
            Ok(_) => {
                tracing::warn!("Rewrite reply was empty, keeping original text");
                RewriteOutcome::unchanged(text, REWRITE_FAILED)
            }
            Err(AssistantError::Cancelled) => RewriteOutcome::unchanged(text, REWRITE_CANCELLED),
            Err(e) => {
                tracing::error!(error = %e, "Error rewriting with assistant");
                RewriteOutcome::unchanged(text, REWRITE_FAILED)
            }
        }
    }

    /// Rewrite summary and role-play prompt concurrently. Empty fields are
    /// left alone; failed fields keep their original text.
    pub async fn rewrite_news_item(
        &self,
        item: &NewsItem,
        cancel: &CancellationToken,
    ) -> RewrittenNewsItem {
        let (summary, prompt) = tokio::join!(
            self.rewrite_field(&item.summary, cancel),
            self.rewrite_field(&item.role_play_prompt, cancel),
        );

        let mut rewritten = item.clone();
        let summary_rewritten = apply(&mut rewritten.summary, summary);
        let prompt_rewritten = apply(&mut rewritten.role_play_prompt, prompt);

        tracing::debug!(
            news_id = %item.id,
            summary_rewritten,
            prompt_rewritten,
            "News item rewrite finished"
        );

        RewrittenNewsItem {
            item: rewritten,
            summary_rewritten,
            prompt_rewritten,
        }
    }

    /// Rewrite many items concurrently, in input order
    pub async fn rewrite_news_items(
        &self,
        items: &[NewsItem],
        cancel: &CancellationToken,
    ) -> Vec<RewrittenNewsItem> {
        let rewrites = items.iter().map(|item| self.rewrite_news_item(item, cancel));
        futures::future::join_all(rewrites).await
    }

    async fn rewrite_field(&self, text: &str, cancel: &CancellationToken) -> Option<RewriteOutcome> {
        if text.trim().is_empty() {
            return None;
        }
        Some(self.rewrite_text(text, cancel).await)
    }
}

fn apply(field: &mut String, outcome: Option<RewriteOutcome>) -> bool {
    match outcome {
        Some(outcome) if outcome.success => {
            *field = outcome.rewritten_text;
            true
        }
        _ => false,
    }
}
