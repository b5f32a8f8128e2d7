//! The LLM provider seam.
//!
//! `faroetest-providers` implements [`LlmProvider`] for the chat-completion API;
//! tests substitute a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM backends that answer a (system prompt, user prompt) pair.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one request and return the model's reply.
    ///
    /// Failures are reported as [`crate::error::ProviderError`] wrapped in
    /// `anyhow::Error`, so callers can downcast to classify them.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// A single chat request: one system message, one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gpt-4o").
    pub model: String,
    /// The user message.
    pub prompt: String,
    /// The system message.
    pub system_prompt: String,
    /// Sampling temperature; the API default when unset.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate; the API default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// The model's reply to a [`GenerateRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Reply text with leading and trailing whitespace stripped.
    pub content: String,
    /// Model that actually answered.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
        self.total_tokens += rhs.total_tokens;
    }
}
