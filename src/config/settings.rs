// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::constants::*;

/// Assistant provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Bearer credential. `None` disables analysis and rewrite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base including the version prefix
    pub base_url: String,

    /// Agent that turns a decision batch into an analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_assistant_id: Option<String>,

    /// Agent that rewrites news summaries and prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_assistant_id: Option<String>,

    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub request_timeout_secs: u64,
    pub max_concurrent_rewrites: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_API_BASE.to_string(),
            analysis_assistant_id: None,
            rewrite_assistant_id: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_rewrites: DEFAULT_MAX_CONCURRENT_REWRITES,
        }
    }
}

impl ProviderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Maximum accepted request body
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    /// Party stance table file (TOML or JSON). Built-in table when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parties_path: Option<PathBuf>,
}

impl Config {
    /// Reject values that would make the service misbehave.
    ///
    /// Missing credentials are allowed: the assistant features report
    /// themselves as not configured instead.
    pub fn validate(&self) -> Result<()> {
        let p = &self.provider;
        if p.poll_interval_ms == 0 {
            bail!("provider.poll_interval_ms must be greater than 0");
        }
        if p.max_poll_attempts == 0 {
            bail!("provider.max_poll_attempts must be greater than 0");
        }
        if p.request_timeout_secs == 0 {
            bail!("provider.request_timeout_secs must be greater than 0");
        }
        if p.max_concurrent_rewrites == 0 {
            bail!("provider.max_concurrent_rewrites must be greater than 0");
        }
        if p.base_url.trim().is_empty() {
            bail!("provider.base_url must not be empty");
        }
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            bail!(
                "server.bind_address '{}' is not a valid socket address",
                self.server.bind_address
            );
        }
        Ok(())
    }
}
