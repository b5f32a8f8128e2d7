//! The `faroetest run` command.

use std::path::PathBuf;

use anyhow::Result;

use faroetest_core::model::{Category, TestResult};
use faroetest_core::parser::{self, TestSuite};
use faroetest_core::results::ResultsStore;
use faroetest_core::runner::{CategoryOutcome, ProgressReporter, TestRunner};
use faroetest_core::statistics::format_percentage;
use faroetest_providers::config::load_config_from;
use faroetest_providers::create_provider;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_case_start(&self, category: Category, index: usize, total: usize) {
        if index == 0 {
            eprintln!("\n{} ({total} cases)", category.title());
        }
    }

    fn on_case_complete(&self, category: Category, index: usize, result: &TestResult) {
        let icon = if result.is_correct { "OK" } else { "MISS" };
        eprintln!(
            "  [{}#{}] {icon} {:?} (expected {:?})",
            category.label(),
            index + 1,
            result.response,
            result.question.expected_answer()
        );
    }

    fn on_category_complete(&self, outcome: &CategoryOutcome) {
        eprintln!(
            "  Done: {}/{} correct, {} tokens, saved to {}",
            outcome.correct,
            outcome.total,
            outcome.token_usage.total_tokens,
            outcome.results_path.display()
        );
    }
}

pub struct RunArgs {
    pub category: Option<String>,
    pub model: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub max_retries: Option<u32>,
    pub temperature: Option<f64>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    // Validate inputs
    if let Some(temperature) = args.temperature {
        anyhow::ensure!(
            (0.0..=2.0).contains(&temperature),
            "temperature must be between 0.0 and 2.0"
        );
    }
    let category = args
        .category
        .as_deref()
        .map(|c| c.parse::<Category>().map_err(anyhow::Error::msg))
        .transpose()?;

    // Load config and apply CLI overrides
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.results_dir {
        config.results_dir = dir;
    }
    if let Some(retries) = args.max_retries {
        config.max_retries = retries;
    }
    if args.temperature.is_some() {
        config.temperature = args.temperature;
    }
    tracing::debug!(?config, "resolved configuration");

    // No credential, no run.
    let provider = create_provider(&config)?;

    let suite = match category {
        Some(category) => {
            let path = parser::fixture_path(&config.data_dir, category);
            let mut suite = TestSuite::default();
            suite
                .categories
                .insert(category, parser::load_category_file(&path, category)?);
            suite
        }
        None => parser::load_test_suite(&config.data_dir)?,
    };

    eprintln!(
        "faroetest v{} — Running {} test cases in {} categories against {}",
        env!("CARGO_PKG_VERSION"),
        suite.total_cases(),
        suite.categories.len(),
        config.model
    );

    let runner = TestRunner::new(
        provider,
        ResultsStore::new(&config.results_dir),
        config.runner_config(),
    );
    let outcomes = runner.run_all(&suite, &ConsoleReporter).await?;

    eprintln!();
    print_summary(&outcomes);

    Ok(())
}

fn print_summary(outcomes: &[CategoryOutcome]) {
    println!("Test Results:");
    for outcome in outcomes {
        println!("{}:", outcome.category.title());
        println!("  Accuracy: {}", format_percentage(outcome.accuracy * 100.0));
        println!("  Correct: {}/{}", outcome.correct, outcome.total);
        println!();
    }
}
