// Analysis reply parsing
//
// The analysis agent's output format has drifted between versions, so the
// reply is read in tiers: JSON object (optionally fenced), then the older
// markdown heading layout, then the raw text as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed analysis. Exactly one of the shapes is populated per reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Structured shape: plain-language summary of the user's decisions
    #[serde(
        rename = "Statement",
        alias = "statement",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub statement: Option<String>,

    /// Structured shape: per-party breakdown
    #[serde(rename = "partyMatches", default, skip_serializing_if = "Option::is_none")]
    pub party_matches: Option<Vec<PartyMatch>>,

    /// Heading shape: "What This Means For You" section
    #[serde(rename = "whatThisMeans", default, skip_serializing_if = "Option::is_none")]
    pub what_this_means: Option<String>,

    /// Heading shape: "Your Political Match" list
    #[serde(rename = "politicalMatch", default, skip_serializing_if = "Option::is_none")]
    pub political_match: Option<Vec<PoliticalMatch>>,

    /// Fallback: the reply text exactly as received
    #[serde(rename = "rawResponse", default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    /// Any other keys of a JSON reply, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyMatch {
    #[serde(default)]
    pub name: String,
    /// `None` when the agent sent something that is not a percentage
    #[serde(rename = "matchPercentage", default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalMatch {
    pub party: String,
    pub percentage: u32,
}

impl AnalysisResult {
    /// Nothing could be extracted; only the raw text is available
    pub fn is_raw_fallback(&self) -> bool {
        self.raw_response.is_some()
            && self.statement.is_none()
            && self.party_matches.is_none()
            && self.what_this_means.is_none()
            && self.political_match.is_none()
    }
}

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```(?:json)?\n?").expect("valid regex"));
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n?```$").expect("valid regex"));
static WHAT_THIS_MEANS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)## What This Means For You\s*(.*?)(?:##|\z)").expect("valid regex")
});
static POLITICAL_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)## Your Political Match\s*(.*)\z").expect("valid regex"));
static PARTY_PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-*]\s*\*\*(.+?)\*\*:\s*(\d+)%").expect("valid regex"));

/// Remove a surrounding ``` or ```json fence
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let opened = FENCE_OPEN.replace(trimmed, "");
    FENCE_CLOSE.replace(&opened, "").into_owned()
}

/// Parse an analysis reply. Never fails: unrecognised text comes back in
/// `raw_response`.
///
/// Any JSON object is accepted as the structured shape. Known keys are
/// read leniently; a known key with an unusable value stays in `extra`.
pub fn parse_analysis_reply(reply: &str) -> AnalysisResult {
    let cleaned = strip_code_fence(reply);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(object)) => {
            tracing::debug!(keys = object.len(), "Analysis reply parsed as JSON");
            return from_json_object(object);
        }
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Analysis reply is JSON but not an object");
        }
        Err(e) => {
            tracing::debug!(error = %e, "Analysis reply is not JSON, trying heading layout");
        }
    }

    let mut result = parse_heading_layout(reply);
    if result.what_this_means.is_none() && result.political_match.is_none() {
        tracing::warn!(
            chars = reply.len(),
            "Analysis reply matched no known layout, passing raw text through"
        );
        result.raw_response = Some(reply.to_string());
    }
    result
}

fn from_json_object(mut object: Map<String, Value>) -> AnalysisResult {
    let statement =
        take_string(&mut object, "Statement").or_else(|| take_string(&mut object, "statement"));
    let party_matches = take_array(&mut object, "partyMatches")
        .map(|entries| entries.iter().filter_map(party_match_from).collect());
    let what_this_means = take_string(&mut object, "whatThisMeans");
    let political_match = take_array(&mut object, "politicalMatch")
        .map(|entries| entries.iter().filter_map(political_match_from).collect());

    AnalysisResult {
        statement,
        party_matches,
        what_this_means,
        political_match,
        raw_response: None,
        extra: object,
    }
}

/// Remove `key` if it holds a string
fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(_)) => match object.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Remove `key` if it holds an array
fn take_array(object: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match object.get(key) {
        Some(Value::Array(_)) => match object.remove(key) {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        },
        _ => None,
    }
}

fn party_match_from(entry: &Value) -> Option<PartyMatch> {
    let Some(fields) = entry.as_object() else {
        tracing::warn!(kind = json_kind(entry), "Skipping party match that is not an object");
        return None;
    };
    Some(PartyMatch {
        name: fields.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
        match_percentage: fields.get("matchPercentage").and_then(lenient_number),
        explanation: fields.get("explanation").and_then(Value::as_str).map(str::to_string),
    })
}

fn political_match_from(entry: &Value) -> Option<PoliticalMatch> {
    let fields = entry.as_object()?;
    let party = fields.get("party").and_then(Value::as_str)?.to_string();
    let percentage = fields.get("percentage").and_then(lenient_number)?;
    if !(0.0..=u32::MAX as f64).contains(&percentage) {
        tracing::warn!(%party, percentage, "Dropping out-of-range political match percentage");
        return None;
    }
    Some(PoliticalMatch {
        party,
        percentage: percentage.round() as u32,
    })
}

/// A number, or a string such as "80" or "80%"
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim_end().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Legacy markdown layout:
///
/// ```text
/// ## What This Means For You
/// ...
/// ## Your Political Match
/// - **Party**: 75%
/// ```
fn parse_heading_layout(reply: &str) -> AnalysisResult {
    let what_this_means = WHAT_THIS_MEANS
        .captures(reply)
        .map(|c| c[1].trim().to_string());

    let political_match = POLITICAL_MATCH
        .captures(reply)
        .map(|c| extract_party_percentages(c[1].trim()));

    AnalysisResult {
        what_this_means,
        political_match,
        ..Default::default()
    }
}

fn extract_party_percentages(section: &str) -> Vec<PoliticalMatch> {
    PARTY_PERCENTAGE
        .captures_iter(section)
        .filter_map(|c| {
            let party = c[1].trim().to_string();
            match c[2].parse() {
                Ok(percentage) => Some(PoliticalMatch { party, percentage }),
                Err(e) => {
                    tracing::warn!(%party, value = &c[2], error = %e, "Dropping unparseable match percentage");
                    None
                }
            }
        })
        .collect()
}
