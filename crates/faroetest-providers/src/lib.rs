//! faroetest-providers — LLM provider integration.
//!
//! Implements the `LlmProvider` trait for the OpenAI chat-completion API and
//! assembles the runtime configuration (config file, `.env`, API key).

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, FaroetestConfig};
pub use error::{ConfigError, ProviderError};
