// Provider-neutral conversation and run types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned conversation (thread) id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

/// Provider-assigned run id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Incomplete,
    Failed,
    Cancelled,
    Expired,
    /// Anything this client does not know about; treated as still running
    #[serde(other)]
    Unknown,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::InProgress => "in_progress",
            RunState::RequiresAction => "requires_action",
            RunState::Cancelling => "cancelling",
            RunState::Completed => "completed",
            RunState::Incomplete => "incomplete",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
            RunState::Expired => "expired",
            RunState::Unknown => "unknown",
        }
    }

    /// Terminal states that end the poll loop with an error
    pub fn is_failure(&self) -> bool {
        matches!(self, RunState::Failed | RunState::Cancelled | RunState::Expired)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one status poll
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub state: RunState,
    /// Provider-reported reason, set on failure states
    pub last_error: Option<String>,
}

impl RunStatus {
    pub fn new(state: RunState) -> Self {
        Self {
            state,
            last_error: None,
        }
    }

    pub fn failed(state: RunState, reason: impl Into<String>) -> Self {
        Self {
            state,
            last_error: Some(reason.into()),
        }
    }
}
