// News items and the decisions users make on them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::alignment::Decision;

/// A news-derived prompt shown on a swipe card. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Opaque identity
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Neutral role-play question shown under the summary
    #[serde(default)]
    pub role_play_prompt: String,
    /// Publisher name (e.g. "Sveriges Radio Ekot")
    #[serde(default)]
    pub source: String,
    /// Free-text topical label; the join key against party stances
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// One committed swipe. Appended to the session history, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecision {
    pub news_id: String,
    pub decision: Decision,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl UserDecision {
    pub fn new(news_id: impl Into<String>, decision: Decision) -> Self {
        Self {
            news_id: news_id.into(),
            decision,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Index news items by id. On duplicate ids the first item wins.
pub fn index_by_id(news: &[NewsItem]) -> HashMap<&str, &NewsItem> {
    let mut index = HashMap::with_capacity(news.len());
    for item in news {
        index.entry(item.id.as_str()).or_insert(item);
    }
    index
}
