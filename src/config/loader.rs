// Configuration loader
// Loads ~/.partysim/config.toml (if present) and applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// Environment variables that override file settings
const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_API_BASE: &str = "OPENAI_API_BASE";
const ENV_ANALYSIS_ASSISTANT_ID: &str = "OPENAI_ANALYSIS_ASSISTANT_ID";
const ENV_REWRITE_ASSISTANT_ID: &str = "OPENAI_ASSISTANT_ID";
const ENV_BIND: &str = "PARTYSIM_BIND";
const ENV_PARTIES_PATH: &str = "PARTYSIM_PARTIES";

/// Default config file location, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from the default file and the process environment
pub fn load_config() -> Result<Config> {
    load_config_from(default_config_path().as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from `path` (missing file = defaults), then apply
/// overrides from `env`, then validate.
pub fn load_config_from<F>(path: Option<&Path>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) if path.exists() => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded config file");
            config
        }
        _ => Config::default(),
    };

    apply_env_overrides(&mut config, env);

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_API_KEY) {
        config.provider.api_key = Some(key);
    }
    if let Some(base) = get(ENV_API_BASE) {
        config.provider.base_url = base;
    }
    if let Some(id) = get(ENV_ANALYSIS_ASSISTANT_ID) {
        config.provider.analysis_assistant_id = Some(id);
    }
    if let Some(id) = get(ENV_REWRITE_ASSISTANT_ID) {
        config.provider.rewrite_assistant_id = Some(id);
    }
    if let Some(bind) = get(ENV_BIND) {
        config.server.bind_address = bind;
    }
    if let Some(path) = get(ENV_PARTIES_PATH) {
        config.parties_path = Some(PathBuf::from(path));
    }
}
