//! The test runner.
//!
//! Runs each category's test cases one at a time against an [`LlmProvider`],
//! scores every reply, and persists the category's results.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::error::{EvalError, ProviderError};
use crate::model::{Category, CategoryRun, TestCase, TestResult};
use crate::parser::TestSuite;
use crate::results::ResultsStore;
use crate::statistics::accuracy;
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the test runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature; the API default when unset.
    pub temperature: Option<f64>,
    /// Max tokens per reply; the API default when unset.
    pub max_tokens: Option<u32>,
    /// Retries on transient provider errors. 0 aborts on the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each one.
    pub retry_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: None,
            max_tokens: None,
            max_retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// The outcome of one completed category.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Fraction of correct results, in `[0, 1]`.
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    /// Results in the same order as the input cases.
    pub results: Vec<TestResult>,
    /// Where the results were written.
    pub results_path: PathBuf,
    /// Tokens spent on the category.
    pub token_usage: TokenUsage,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_case_start(&self, category: Category, index: usize, total: usize);
    fn on_case_complete(&self, category: Category, index: usize, result: &TestResult);
    fn on_category_complete(&self, outcome: &CategoryOutcome);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_case_start(&self, _: Category, _: usize, _: usize) {}
    fn on_case_complete(&self, _: Category, _: usize, _: &TestResult) {}
    fn on_category_complete(&self, _: &CategoryOutcome) {}
}

/// Runs test cases against a provider and persists the results.
pub struct TestRunner {
    provider: Arc<dyn LlmProvider>,
    store: ResultsStore,
    config: RunnerConfig,
}

impl TestRunner {
    pub fn new(provider: Arc<dyn LlmProvider>, store: ResultsStore, config: RunnerConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    /// Run every category of the suite in order.
    ///
    /// The first category that fails aborts the run.
    pub async fn run_all(
        &self,
        suite: &TestSuite,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<CategoryOutcome>> {
        let mut outcomes = Vec::with_capacity(suite.categories.len());
        for (&category, cases) in &suite.categories {
            outcomes.push(self.run_category(category, cases, progress).await?);
        }
        Ok(outcomes)
    }

    /// Run one category's cases sequentially, in input order.
    ///
    /// The full result sequence is written to the results store before this
    /// returns. If the provider fails, the category aborts; the cases that did
    /// complete are checkpointed to a partial file first.
    #[instrument(skip_all, fields(category = %category))]
    pub async fn run_category(
        &self,
        category: Category,
        cases: &[TestCase],
        progress: &dyn ProgressReporter,
    ) -> Result<CategoryOutcome> {
        if cases.is_empty() {
            return Err(EvalError::EmptyCategory(category.key().to_string()).into());
        }

        // Reject bad fixtures before spending any requests.
        let prompts = cases
            .iter()
            .enumerate()
            .map(|(index, case)| {
                case.prompt(category).map_err(|reason| EvalError::InvalidCase {
                    category: category.key().to_string(),
                    index,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = cases.len();
        tracing::info!(cases = total, model = %self.config.model, "running category");

        let mut run = CategoryRun::new(category, total);
        let mut token_usage = TokenUsage::default();

        for (index, (case, prompt)) in cases.iter().zip(prompts).enumerate() {
            progress.on_case_start(category, index, total);

            let response = match self.generate_response(&prompt, case.system_prompt()).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("case #{index} failed: {e:#}");
                    self.checkpoint(&run);
                    return Err(e.context(format!(
                        "category '{category}' aborted at case #{index} of {total}"
                    )));
                }
            };

            token_usage += response.token_usage;
            let result = TestResult::score(case.clone(), response.content);
            tracing::debug!(
                index,
                correct = result.is_correct,
                latency_ms = response.latency_ms,
                "scored response"
            );
            progress.on_case_complete(category, index, &result);
            run.push(result);
        }

        let correct = run.correct();
        let accuracy = accuracy(&run.results)?;
        let results_path = self
            .store
            .save(category, &run.results)
            .with_context(|| format!("failed to save '{category}' results"))?;
        tracing::info!(
            correct,
            total,
            path = %results_path.display(),
            "category complete"
        );

        let outcome = CategoryOutcome {
            category,
            accuracy,
            correct,
            total,
            results: run.results,
            results_path,
            token_usage,
        };
        progress.on_category_complete(&outcome);
        Ok(outcome)
    }

    /// Send one (prompt, system prompt) pair and return the trimmed reply.
    pub async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        Ok(self.generate_response(prompt, system_prompt).await?.content)
    }

    /// Call the provider, retrying transient errors with exponential backoff.
    async fn generate_response(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<GenerateResponse> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            system_prompt: system_prompt.to_string(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut retry_delay = self.config.retry_delay;
        let mut attempt = 0u32;
        loop {
            match self.provider.generate(&request).await {
                Ok(mut response) => {
                    response.content = response.content.trim().to_string();
                    return Ok(response);
                }
                Err(e) => {
                    let classified = e.downcast_ref::<ProviderError>();
                    let permanent = classified.is_some_and(ProviderError::is_permanent);
                    if permanent || attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    // Use provider's retry-after hint if available, capped
                    if let Some(ms) = classified.and_then(ProviderError::retry_after_ms) {
                        retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                    }
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = retry_delay.as_millis() as u64,
                        "provider error, retrying: {e}"
                    );
                    tokio::time::sleep(retry_delay).await;
                    retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }
    }

    fn checkpoint(&self, run: &CategoryRun) {
        if run.results.is_empty() {
            return;
        }
        match self.store.save_checkpoint(run.category, &run.results) {
            Ok(path) => tracing::warn!(
                completed = run.results.len(),
                path = %path.display(),
                "checkpointed completed cases"
            ),
            Err(e) => tracing::error!("failed to checkpoint completed cases: {e:#}"),
        }
    }
}
