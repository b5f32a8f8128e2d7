//! Provider and configuration error types.

use thiserror::Error;

pub use faroetest_core::error::ProviderError;

/// Errors raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key in the environment, `.env`, or config file.
    #[error("API key not found. Please set the {0} environment variable.")]
    MissingApiKey(&'static str),

    /// An explicit `--config` path that doesn't exist.
    #[error("config file not found: {0}")]
    NotFound(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
