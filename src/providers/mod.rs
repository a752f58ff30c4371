// Assistant provider abstraction
//
// The analysis and rewrite pipelines talk to a hosted conversational agent
// through five operations. Anything that can open a conversation, post to it,
// start a run, report run status and hand back the latest reply can stand in
// for the OpenAI Assistants API.

use async_trait::async_trait;

use crate::errors::AssistantError;

pub mod openai;
pub mod types;

pub use openai::OpenAIAssistants;
pub use types::{ConversationId, RunId, RunState, RunStatus};

/// A hosted agent reached over a thread/run/poll protocol
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Open a new, empty conversation
    async fn start_conversation(&self) -> Result<ConversationId, AssistantError>;

    /// Append a user message to a conversation
    async fn post_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> Result<(), AssistantError>;

    /// Start processing the conversation with the given agent
    async fn start_run(
        &self,
        conversation: &ConversationId,
        assistant_id: &str,
    ) -> Result<RunId, AssistantError>;

    /// Current status of a run
    async fn poll_run_status(
        &self,
        conversation: &ConversationId,
        run: &RunId,
    ) -> Result<RunStatus, AssistantError>;

    /// Text of the newest agent-authored message, if any
    async fn fetch_latest_reply(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<String>, AssistantError>;

    /// Provider name for logs (e.g. "openai")
    fn name(&self) -> &str;
}
