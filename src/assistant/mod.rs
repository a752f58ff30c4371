// Assistant-backed features
//
// Narrative analysis of a decision history and rewriting of news text, both
// delegated to a hosted agent through the same conversation protocol.

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod analysis;
pub mod parse;
pub mod rewrite;
pub mod runner;

pub use analysis::{format_decisions, AnalysisService, FormattedDecision};
pub use parse::{parse_analysis_reply, AnalysisResult, PartyMatch, PoliticalMatch};
pub use rewrite::{RewriteOutcome, RewriteService, RewrittenNewsItem};
pub use runner::{AssistantRunner, PollPolicy};

use crate::config::ProviderConfig;
use crate::errors::AssistantError;
use crate::providers::{AssistantBackend, OpenAIAssistants};

/// A specific agent on a backend, or the reason there is none
#[derive(Clone)]
pub enum AssistantTarget {
    Ready {
        runner: AssistantRunner,
        assistant_id: String,
    },
    Unconfigured {
        missing: Vec<&'static str>,
    },
}

impl AssistantTarget {
    /// Resolve a target from an optional backend and agent id.
    /// `id_key` names the config key reported when the id is missing.
    pub fn resolve(
        backend: Option<&Arc<dyn AssistantBackend>>,
        policy: PollPolicy,
        assistant_id: Option<&str>,
        id_key: &'static str,
    ) -> Self {
        let assistant_id = assistant_id.map(str::trim).filter(|id| !id.is_empty());
        match (backend, assistant_id) {
            (Some(backend), Some(id)) => AssistantTarget::Ready {
                runner: AssistantRunner::new(Arc::clone(backend), policy),
                assistant_id: id.to_string(),
            },
            _ => {
                let mut missing = Vec::new();
                if backend.is_none() {
                    missing.push("api_key");
                }
                if assistant_id.is_none() {
                    missing.push(id_key);
                }
                AssistantTarget::Unconfigured { missing }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AssistantTarget::Ready { .. })
    }

    /// Run `content` through the agent, or report what configuration is missing
    pub async fn run(
        &self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AssistantError> {
        match self {
            AssistantTarget::Ready {
                runner,
                assistant_id,
            } => runner.run(assistant_id, content, cancel).await,
            AssistantTarget::Unconfigured { missing } => {
                let err = AssistantError::not_configured(missing);
                tracing::error!(error = %err, "Assistant call skipped");
                Err(err)
            }
        }
    }
}

/// Both assistant services, built from one provider configuration
#[derive(Clone)]
pub struct Assistants {
    pub analysis: AnalysisService,
    pub rewrite: RewriteService,
}

impl Assistants {
    /// Build against the configured OpenAI endpoint. A missing API key is
    /// not an error here; the services report themselves as not configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let backend: Option<Arc<dyn AssistantBackend>> = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(OpenAIAssistants::with_base_url(
                key.to_string(),
                config.base_url.clone(),
                config.request_timeout(),
            )?)),
            _ => None,
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Build against any backend (tests, alternate providers)
    pub fn with_backend(config: &ProviderConfig, backend: Option<Arc<dyn AssistantBackend>>) -> Self {
        let policy = PollPolicy::from_config(config);

        let analysis = AssistantTarget::resolve(
            backend.as_ref(),
            policy,
            config.analysis_assistant_id.as_deref(),
            "analysis_assistant_id",
        );
        let rewrite = AssistantTarget::resolve(
            backend.as_ref(),
            policy,
            config.rewrite_assistant_id.as_deref(),
            "rewrite_assistant_id",
        );

        if let AssistantTarget::Unconfigured { missing } = &analysis {
            tracing::warn!(missing = %missing.join(", "), "Narrative analysis disabled");
        }
        if let AssistantTarget::Unconfigured { missing } = &rewrite {
            tracing::warn!(missing = %missing.join(", "), "News rewriting disabled");
        }

        Self {
            analysis: AnalysisService::new(analysis),
            rewrite: RewriteService::new(rewrite, config.max_concurrent_rewrites),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::runner::tests::FakeBackend;

    #[test]
    fn test_resolve_reports_all_missing_keys() {
        let target = AssistantTarget::resolve(None, PollPolicy::default(), None, "analysis_assistant_id");
        match target {
            AssistantTarget::Unconfigured { missing } => {
                assert_eq!(missing, vec!["api_key", "analysis_assistant_id"]);
            }
            AssistantTarget::Ready { .. } => panic!("expected unconfigured"),
        }
    }

    #[test]
    fn test_blank_assistant_id_is_missing() {
        let backend: Arc<dyn AssistantBackend> = Arc::new(FakeBackend::stuck());
        let target =
            AssistantTarget::resolve(Some(&backend), PollPolicy::default(), Some("  "), "rewrite_assistant_id");
        assert!(!target.is_ready());
    }

    #[test]
    fn test_from_config_without_key() {
        let mut config = ProviderConfig::default();
        config.analysis_assistant_id = Some("asst_1".to_string());
        let assistants = Assistants::from_config(&config).unwrap();
        assert!(!assistants.analysis.is_configured());
        assert!(!assistants.rewrite.is_configured());
    }

    #[test]
    fn test_from_config_with_key_and_ids() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            analysis_assistant_id: Some("asst_a".to_string()),
            rewrite_assistant_id: Some("asst_r".to_string()),
            ..Default::default()
        };
        let assistants = Assistants::from_config(&config).unwrap();
        assert!(assistants.analysis.is_configured());
        assert!(assistants.rewrite.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_target_makes_no_call() {
        let target = AssistantTarget::resolve(None, PollPolicy::default(), Some("asst"), "x");
        let err = target.run("hi", &CancellationToken::new()).await.unwrap_err();
        assert!(err.is_not_configured());
        assert_eq!(err.to_string(), "Assistant service not configured (missing api_key)");
    }
}
