//! faroetest-report — accuracy summaries and chart rendering.
//!
//! Reads persisted category results, computes per-category accuracy, and
//! renders the accuracy bar chart.

pub mod chart;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use faroetest_core::model::Category;
use faroetest_core::results::{load_results, ResultsStore};
use faroetest_core::statistics::{AccuracySummary, CategoryAccuracy};

/// File name of the chart inside the results directory.
pub const CHART_FILE: &str = "accuracy_plot.svg";

/// Order bars appear on the chart.
pub const CHART_ORDER: [Category; 3] = [
    Category::GrammarRuleApplication,
    Category::MorphologicalUnderstanding,
    Category::TranslationAccuracy,
];

/// The most recent results file of every category, in chart order.
///
/// A category with no results yet is an error.
pub fn latest_results(store: &ResultsStore) -> Result<Vec<(Category, PathBuf)>> {
    CHART_ORDER
        .iter()
        .map(|&category| -> Result<(Category, PathBuf)> {
            Ok((category, store.require_latest(category)?))
        })
        .collect()
}

/// Load every results file and compute its accuracy.
///
/// Any missing, malformed, or empty file fails the whole summary.
pub fn accuracy_summary(files: &[(Category, PathBuf)]) -> Result<AccuracySummary> {
    let mut summary = AccuracySummary::default();
    for (category, path) in files {
        let results = load_results(path)?;
        let entry = CategoryAccuracy::from_results(*category, &results)
            .with_context(|| format!("cannot score {}", path.display()))?;
        tracing::debug!(
            category = %category,
            correct = entry.correct,
            total = entry.total,
            "scored results file"
        );
        summary.push(entry);
    }
    Ok(summary)
}

/// Compute the summary and write the chart to `output`.
///
/// Nothing is written unless every category scores.
pub fn render(files: &[(Category, PathBuf)], output: &Path) -> Result<AccuracySummary> {
    let summary = accuracy_summary(files)?;
    chart::write_chart(&summary, output)?;
    tracing::info!(path = %output.display(), "accuracy chart written");
    Ok(summary)
}
