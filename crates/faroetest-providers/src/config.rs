//! Runtime configuration and provider factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use faroetest_core::runner::RunnerConfig;
use faroetest_core::traits::LlmProvider;

use crate::error::ConfigError;
use crate::openai::OpenAiProvider;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Top-level faroetest configuration.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct FaroetestConfig {
    /// API key; `${VAR}` references are resolved. `OPENAI_API_KEY` overrides it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the chat-completion API.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Optional OpenAI organization header.
    #[serde(default)]
    pub org_id: Option<String>,
    /// Model to evaluate.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature; omitted from requests when unset.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Max tokens per reply; omitted from requests when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// HTTP timeout; the client default when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Retries on transient provider errors.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Directory holding the test case fixtures.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory results and the chart are written to.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl std::fmt::Debug for FaroetestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaroetestConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("data_dir", &self.data_dir)
            .field("results_dir", &self.results_dir)
            .finish()
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for FaroetestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            org_id: None,
            model: default_model(),
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            max_retries: 0,
            retry_delay_ms: default_retry_delay(),
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
        }
    }
}

impl FaroetestConfig {
    /// The API key, or a configuration error if none was supplied.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))
    }

    /// Runner settings derived from this config.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted literally and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Apply the `OPENAI_API_KEY` override and resolve `${VAR}` references.
fn apply_env_overrides(config: &mut FaroetestConfig, env_key: Option<String>) {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key);
    }
    config.api_key = config.api_key.as_deref().map(resolve_env_vars);
    config.base_url = config.base_url.as_deref().map(resolve_env_vars);
    config.org_id = config.org_id.as_deref().map(resolve_env_vars);
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `faroetest.toml` in the current directory
/// 2. `~/.config/faroetest/config.toml`
///
/// A `.env` file in the current directory is loaded first, then
/// `OPENAI_API_KEY` overrides any configured key.
pub fn load_config() -> Result<FaroetestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<FaroetestConfig> {
    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!("loaded environment from {}", env_file.display());
    }

    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(ConfigError::NotFound(p.display().to_string()).into()),
        None => {
            let local = PathBuf::from("faroetest.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<FaroetestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => FaroetestConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::var(API_KEY_VAR).ok());
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("faroetest"))
}

/// Create the chat-completion provider. Fails if no API key is configured.
pub fn create_provider(config: &FaroetestConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider = OpenAiProvider::new(
        config.api_key()?,
        config.base_url.clone(),
        config.org_id.clone(),
        config.timeout_secs,
    )?;
    Ok(Arc::new(provider))
}
