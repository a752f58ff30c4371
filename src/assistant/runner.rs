// Conversation protocol runner
//
// open conversation -> post message -> start run -> poll -> latest reply.
// One attempt per step; any failure ends the chain.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::constants::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use crate::config::ProviderConfig;
use crate::errors::AssistantError;
use crate::providers::{AssistantBackend, ConversationId, RunId, RunState};

/// How often and how long to poll a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }

    /// Upper bound on time spent polling
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Drives one message through an [`AssistantBackend`]
#[derive(Clone)]
pub struct AssistantRunner {
    backend: Arc<dyn AssistantBackend>,
    policy: PollPolicy,
}

impl AssistantRunner {
    pub fn new(backend: Arc<dyn AssistantBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Send `content` as the only message of a fresh conversation with
    /// `assistant_id` and return the agent's reply text.
    pub async fn run(
        &self,
        assistant_id: &str,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AssistantError> {
        let backend = self.backend.as_ref();

        let conversation = cancellable(cancel, backend.start_conversation()).await?;
        tracing::info!(
            provider = backend.name(),
            thread_id = %conversation,
            "Opened assistant conversation"
        );

        cancellable(cancel, backend.post_message(&conversation, content)).await?;

        let run = cancellable(cancel, backend.start_run(&conversation, assistant_id)).await?;
        tracing::info!(thread_id = %conversation, run_id = %run, assistant_id, "Started assistant run");

        self.wait_for_reply(&conversation, &run, cancel).await
    }

    async fn wait_for_reply(
        &self,
        conversation: &ConversationId,
        run: &RunId,
        cancel: &CancellationToken,
    ) -> Result<String, AssistantError> {
        let backend = self.backend.as_ref();

        for attempt in 1..=self.policy.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AssistantError::Cancelled),
                _ = sleep(self.policy.interval) => {}
            }

            let status = cancellable(cancel, backend.poll_run_status(conversation, run)).await?;

            match status.state {
                RunState::Completed => {
                    tracing::debug!(run_id = %run, attempt, "Run completed");
                    let reply = cancellable(cancel, backend.fetch_latest_reply(conversation)).await?;
                    return reply.ok_or(AssistantError::MissingReply);
                }
                state if state.is_failure() => {
                    let reason = status
                        .last_error
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "Unknown error".to_string());
                    tracing::error!(run_id = %run, %state, %reason, "Assistant run ended without a reply");
                    return Err(AssistantError::RunFailed {
                        status: state.to_string(),
                        reason,
                    });
                }
                state => {
                    tracing::debug!(run_id = %run, attempt, %state, "Run still in progress");
                }
            }
        }

        tracing::error!(
            run_id = %run,
            attempts = self.policy.max_attempts,
            "Timed out waiting for assistant run"
        );
        Err(AssistantError::Timeout {
            attempts: self.policy.max_attempts,
        })
    }
}

/// Race a protocol step against cancellation
async fn cancellable<T, F>(cancel: &CancellationToken, step: F) -> Result<T, AssistantError>
where
    F: Future<Output = Result<T, AssistantError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AssistantError::Cancelled),
        result = step => result,
    }
}
