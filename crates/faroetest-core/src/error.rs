//! Error types shared across faroetest.
//!
//! `ProviderError` lives here rather than in `faroetest-providers` so the test
//! runner can downcast and classify failures for retry decisions without
//! string matching.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The API answered, but not with anything we can score.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::ModelNotFound(_)
                | ProviderError::MalformedResponse(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Data errors raised while loading, running, or scoring test cases.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A category had no test cases to run.
    #[error("category '{0}' has no test cases")]
    EmptyCategory(String),

    /// A results file held no results, so accuracy is undefined.
    #[error("no results to score in {0}")]
    EmptyResults(String),

    /// A test case cannot be turned into a prompt.
    #[error("invalid test case #{index} in '{category}': {reason}")]
    InvalidCase {
        category: String,
        index: usize,
        reason: String,
    },

    /// A fixture file is missing its top-level category key.
    #[error("'{path}' has no top-level key '{key}'")]
    MissingCategoryKey { path: String, key: String },

    /// No results file exists yet for a category.
    #[error("no results file found for '{category}' in {dir}")]
    NoResultsFile { category: String, dir: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors_are_not_retried() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("gpt-0".into()).is_permanent());
        assert!(ProviderError::MalformedResponse("no choices".into()).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
        assert!(!ProviderError::NetworkError("reset".into()).is_permanent());
        assert!(!ProviderError::RateLimited {
            retry_after_ms: 1000
        }
        .is_permanent());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let limited = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(limited.retry_after_ms(), Some(5000));
        assert_eq!(ProviderError::Timeout(1).retry_after_ms(), None);
    }
}
