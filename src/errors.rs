// Error types for the assistant pipeline
//
// Everything provider-side collapses to one user-safe message; the variant
// and its detail are for logs.

use thiserror::Error;

/// Step of the conversation protocol an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStep {
    CreateThread,
    AddMessage,
    StartRun,
    CheckRunStatus,
    ListMessages,
}

impl ProtocolStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolStep::CreateThread => "create thread",
            ProtocolStep::AddMessage => "add message",
            ProtocolStep::StartRun => "run assistant",
            ProtocolStep::CheckRunStatus => "check run status",
            ProtocolStep::ListMessages => "get messages",
        }
    }
}

impl std::fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an analysis or rewrite request
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("At least one decision is required for analysis")]
    EmptyDecisions,

    #[error("Assistant service not configured (missing {missing})")]
    NotConfigured { missing: String },

    #[error("Failed to {step}: {status}")]
    Transport {
        step: ProtocolStep,
        status: String,
        body: String,
    },

    #[error("Failed to {step}: {source}")]
    Http {
        step: ProtocolStep,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to {step}: unexpected response ({reason})")]
    Decode { step: ProtocolStep, reason: String },

    #[error("Run {status}: {reason}")]
    RunFailed { status: String, reason: String },

    #[error("Timeout waiting for assistant response after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("No assistant response found")]
    MissingReply,

    #[error("Request cancelled while waiting for assistant")]
    Cancelled,

    #[error("Failed to encode assistant message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Message shown to end users for any provider-side failure
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze decisions";

/// Message shown to end users when credentials are missing
pub const NOT_CONFIGURED_MESSAGE: &str = "Analysis service not configured";

impl AssistantError {
    pub fn not_configured(missing: &[&str]) -> Self {
        AssistantError::NotConfigured {
            missing: missing.join(", "),
        }
    }

    /// Caller's fault: nothing was sent to the provider
    pub fn is_client_error(&self) -> bool {
        matches!(self, AssistantError::EmptyDecisions)
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, AssistantError::NotConfigured { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AssistantError::Timeout { .. })
    }

    /// Stable, user-safe summary. Provider detail never appears here.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::EmptyDecisions => self.to_string(),
            AssistantError::NotConfigured { .. } => NOT_CONFIGURED_MESSAGE.to_string(),
            _ => ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }

    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AssistantError::EmptyDecisions => "INVALID_REQUEST",
            AssistantError::NotConfigured { .. } => "NOT_CONFIGURED",
            _ => "ANALYSIS_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_names_step() {
        let err = AssistantError::Transport {
            step: ProtocolStep::CreateThread,
            status: "401 Unauthorized".to_string(),
            body: "{\"error\":\"bad key\"}".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to create thread: 401 Unauthorized");
    }

    #[test]
    fn test_user_message_hides_provider_detail() {
        let err = AssistantError::RunFailed {
            status: "failed".to_string(),
            reason: "rate_limit_exceeded for org-123".to_string(),
        };
        assert_eq!(err.user_message(), ANALYSIS_FAILED_MESSAGE);
        assert!(!err.user_message().contains("org-123"));

        let timeout = AssistantError::Timeout { attempts: 30 };
        assert!(timeout.is_timeout());
        assert_eq!(timeout.user_message(), ANALYSIS_FAILED_MESSAGE);
    }

    #[test]
    fn test_not_configured_is_distinct() {
        let err = AssistantError::not_configured(&["api_key", "analysis_assistant_id"]);
        assert!(err.is_not_configured());
        assert_eq!(err.code(), "NOT_CONFIGURED");
        assert_eq!(
            err.to_string(),
            "Assistant service not configured (missing api_key, analysis_assistant_id)"
        );
    }

    #[test]
    fn test_empty_decisions_is_client_error() {
        let err = AssistantError::EmptyDecisions;
        assert!(err.is_client_error());
        assert_eq!(err.user_message(), "At least one decision is required for analysis");
    }
}
