// OpenAI Assistants API backend
//
// Threads, messages and runs over the v2 beta API. Every request carries the
// bearer key and the `OpenAI-Beta: assistants=v2` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{ConversationId, RunId, RunState, RunStatus};
use super::AssistantBackend;
use crate::config::constants::{DEFAULT_OPENAI_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::errors::{AssistantError, ProtocolStep};

const ASSISTANTS_BETA: &str = "assistants=v2";

/// OpenAI Assistants v2 client
#[derive(Clone)]
pub struct OpenAIAssistants {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIAssistants {
    /// Client against the public OpenAI endpoint
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(
            api_key,
            DEFAULT_OPENAI_API_BASE.to_string(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Client against a custom endpoint (proxies, compatible servers, tests)
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    async fn send(&self, step: ProtocolStep, builder: RequestBuilder) -> Result<Response, AssistantError> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|source| AssistantError::Http { step, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%step, %status, %body, "OpenAI Assistants request failed");
            return Err(AssistantError::Transport {
                step,
                status: status.to_string(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        step: ProtocolStep,
        builder: RequestBuilder,
    ) -> Result<T, AssistantError> {
        let response = self.send(step, builder).await?;
        response.json::<T>().await.map_err(|e| AssistantError::Decode {
            step,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl AssistantBackend for OpenAIAssistants {
    async fn start_conversation(&self) -> Result<ConversationId, AssistantError> {
        let url = format!("{}/threads", self.base_url);
        let thread: ObjectRef = self
            .send_json(
                ProtocolStep::CreateThread,
                self.client.post(&url).json(&serde_json::json!({})),
            )
            .await?;

        tracing::debug!(thread_id = %thread.id, "Created thread");
        Ok(ConversationId(thread.id))
    }

    async fn post_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> Result<(), AssistantError> {
        let url = format!("{}/threads/{}/messages", self.base_url, conversation);
        let body = CreateMessage {
            role: "user",
            content,
        };
        self.send(ProtocolStep::AddMessage, self.client.post(&url).json(&body))
            .await?;
        Ok(())
    }

    async fn start_run(
        &self,
        conversation: &ConversationId,
        assistant_id: &str,
    ) -> Result<RunId, AssistantError> {
        let url = format!("{}/threads/{}/runs", self.base_url, conversation);
        let body = CreateRun { assistant_id };
        let run: ObjectRef = self
            .send_json(ProtocolStep::StartRun, self.client.post(&url).json(&body))
            .await?;

        tracing::debug!(thread_id = %conversation, run_id = %run.id, "Started run");
        Ok(RunId(run.id))
    }

    async fn poll_run_status(
        &self,
        conversation: &ConversationId,
        run: &RunId,
    ) -> Result<RunStatus, AssistantError> {
        let url = format!("{}/threads/{}/runs/{}", self.base_url, conversation, run);
        let run: RunObject = self
            .send_json(ProtocolStep::CheckRunStatus, self.client.get(&url))
            .await?;

        Ok(RunStatus {
            state: run.status,
            last_error: run.last_error.map(|e| e.message),
        })
    }

    async fn fetch_latest_reply(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<String>, AssistantError> {
        let url = format!("{}/threads/{}/messages", self.base_url, conversation);
        let list: MessageList = self
            .send_json(ProtocolStep::ListMessages, self.client.get(&url))
            .await?;

        // Listed newest first
        Ok(list
            .data
            .into_iter()
            .find(|m| m.role == "assistant")
            .and_then(|m| m.content.into_iter().find_map(|block| block.text))
            .map(|text| text.value)
            .filter(|value| !value.is_empty()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRun<'a> {
    assistant_id: &'a str,
}

/// Any API object where only the id matters (thread, run on creation)
#[derive(Debug, Deserialize)]
struct ObjectRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: RunState,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn backend(server: &mockito::ServerGuard) -> OpenAIAssistants {
        OpenAIAssistants::with_base_url(
            "sk-test".to_string(),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(OpenAIAssistants::new("test-key".to_string()).is_ok());
    }

    #[tokio::test]
    async fn test_create_thread_sends_auth_and_beta_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/threads")
            .match_header("authorization", "Bearer sk-test")
            .match_header("openai-beta", "assistants=v2")
            .with_status(200)
            .with_body(r#"{"id":"thread_abc","object":"thread"}"#)
            .create_async()
            .await;

        let id = backend(&server).start_conversation().await.unwrap();
        assert_eq!(id, ConversationId("thread_abc".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/threads/thread_abc/messages")
            .match_body(Matcher::Json(serde_json::json!({
                "role": "user",
                "content": "hello"
            })))
            .with_status(200)
            .with_body(r#"{"id":"msg_1"}"#)
            .create_async()
            .await;

        backend(&server)
            .post_message(&ConversationId("thread_abc".to_string()), "hello")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_run_binds_assistant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/threads/t1/runs")
            .match_body(Matcher::Json(serde_json::json!({ "assistant_id": "asst_1" })))
            .with_status(200)
            .with_body(r#"{"id":"run_9","status":"queued"}"#)
            .create_async()
            .await;

        let run = backend(&server)
            .start_run(&ConversationId("t1".to_string()), "asst_1")
            .await
            .unwrap();
        assert_eq!(run, RunId("run_9".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_reports_last_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/threads/t1/runs/r1")
            .with_status(200)
            .with_body(r#"{"id":"r1","status":"failed","last_error":{"code":"server_error","message":"boom"}}"#)
            .create_async()
            .await;

        let status = backend(&server)
            .poll_run_status(&ConversationId("t1".to_string()), &RunId("r1".to_string()))
            .await
            .unwrap();
        assert_eq!(status.state, RunState::Failed);
        assert_eq!(status.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_latest_reply_is_first_assistant_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/threads/t1/messages")
            .with_status(200)
            .with_body(
                r#"{"data":[
                    {"role":"assistant","content":[{"type":"text","text":{"value":"newest","annotations":[]}}]},
                    {"role":"user","content":[{"type":"text","text":{"value":"question"}}]},
                    {"role":"assistant","content":[{"type":"text","text":{"value":"older"}}]}
                ]}"#,
            )
            .create_async()
            .await;

        let reply = backend(&server)
            .fetch_latest_reply(&ConversationId("t1".to_string()))
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("newest"));
    }

    #[tokio::test]
    async fn test_no_assistant_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/threads/t1/messages")
            .with_status(200)
            .with_body(r#"{"data":[{"role":"user","content":[{"type":"text","text":{"value":"q"}}]}]}"#)
            .create_async()
            .await;

        let reply = backend(&server)
            .fetch_latest_reply(&ConversationId("t1".to_string()))
            .await
            .unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_wraps_step() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/threads")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
            .create_async()
            .await;

        let err = backend(&server).start_conversation().await.unwrap_err();
        match &err {
            AssistantError::Transport { step, status, body } => {
                assert_eq!(*step, ProtocolStep::CreateThread);
                assert_eq!(status, "401 Unauthorized");
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Failed to create thread: 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/threads/t1/runs")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = backend(&server)
            .start_run(&ConversationId("t1".to_string()), "asst")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Decode {
                step: ProtocolStep::StartRun,
                ..
            }
        ));
    }
}
