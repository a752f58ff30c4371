// HTTP request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::{CancellationToken, DropGuard};

use super::error::HandlerError;
use super::AppState;
use crate::alignment::{aggregate_and_score, AlignmentResult, RealParty};
use crate::assistant::{AnalysisResult, RewriteOutcome, RewrittenNewsItem};
use crate::news::{NewsItem, UserDecision};

/// Decision history plus the news items it refers to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionsRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub decisions: Vec<UserDecision>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub news_items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteNewsRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub news_items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteNewsResponse {
    pub news_items: Vec<RewrittenNewsItem>,
}

/// An explicit `null` list reads the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token cancelled when the handler future is dropped, i.e. when the
/// client goes away mid-request.
fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "partysim",
        "version": env!("CARGO_PKG_VERSION"),
        "analysis": state.assistants.analysis.is_configured(),
        "rewrite": state.assistants.rewrite.is_configured(),
    }))
}

pub async fn list_parties(State(state): State<AppState>) -> Json<Vec<RealParty>> {
    Json(state.parties.parties().to_vec())
}

pub async fn handle_alignment(
    State(state): State<AppState>,
    body: Result<Json<DecisionsRequest>, JsonRejection>,
) -> Result<Json<Vec<AlignmentResult>>, HandlerError> {
    let Json(req) = body?;
    let results = aggregate_and_score(&req.decisions, &req.news_items, &state.parties);
    tracing::debug!(decisions = req.decisions.len(), "Scored alignment");
    Ok(Json(results))
}

pub async fn handle_analyze(
    State(state): State<AppState>,
    body: Result<Json<DecisionsRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, HandlerError> {
    let Json(req) = body?;
    let (cancel, _guard) = request_token();
    let result = state
        .assistants
        .analysis
        .request_analysis(&req.decisions, &req.news_items, &cancel)
        .await?;
    Ok(Json(result))
}

pub async fn handle_rewrite(
    State(state): State<AppState>,
    body: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<RewriteOutcome>, HandlerError> {
    let Json(req) = body?;
    let (cancel, _guard) = request_token();
    Ok(Json(state.assistants.rewrite.rewrite_text(&req.text, &cancel).await))
}

pub async fn handle_rewrite_news(
    State(state): State<AppState>,
    body: Result<Json<RewriteNewsRequest>, JsonRejection>,
) -> Result<Json<RewriteNewsResponse>, HandlerError> {
    let Json(req) = body?;
    let (cancel, _guard) = request_token();
    let news_items = state
        .assistants
        .rewrite
        .rewrite_news_items(&req.news_items, &cancel)
        .await;
    Ok(Json(RewriteNewsResponse { news_items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_lists_read_as_empty() {
        let req: DecisionsRequest =
            serde_json::from_str(r#"{"decisions": null, "newsItems": null}"#).unwrap();
        assert!(req.decisions.is_empty());
        assert!(req.news_items.is_empty());

        let req: RewriteNewsRequest = serde_json::from_str(r#"{"newsItems": null}"#).unwrap();
        assert!(req.news_items.is_empty());
    }

    #[test]
    fn test_missing_lists_read_as_empty() {
        let req: DecisionsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.decisions.is_empty());
        assert!(req.news_items.is_empty());
    }

    #[test]
    fn test_wrong_list_type_is_an_error() {
        assert!(serde_json::from_str::<DecisionsRequest>(r#"{"decisions": "all"}"#).is_err());
    }
}
