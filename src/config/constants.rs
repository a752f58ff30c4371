// Project-wide constants
//
// Centralised here so endpoints, poll limits and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Base URL of the hosted OpenAI API (v1 prefix included).
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Per-request HTTP timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Wait between run status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Status polls before giving up. With the default interval this is a 30 s
/// ceiling on one analysis or rewrite.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

/// Provider conversations that rewrites may hold open at once, process-wide.
pub const DEFAULT_MAX_CONCURRENT_REWRITES: usize = 4;

/// Default bind address for the HTTP server (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// Request body limit for the HTTP server. A week of decisions plus their
/// news items fits comfortably.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Config directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".partysim";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";
