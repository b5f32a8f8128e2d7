//! The `faroetest plot` command.

use std::path::PathBuf;

use anyhow::Result;

use faroetest_core::results::ResultsStore;
use faroetest_core::statistics::AccuracySummary;
use faroetest_providers::config::load_config_from;
use faroetest_report::{latest_results, render, CHART_FILE};

pub fn execute(
    results_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let results_dir = results_dir.unwrap_or(config.results_dir);
    let output = output.unwrap_or_else(|| results_dir.join(CHART_FILE));

    let store = ResultsStore::new(&results_dir);
    let files = latest_results(&store)?;
    for (category, path) in &files {
        tracing::debug!(category = %category, path = %path.display(), "using results file");
    }

    let summary = render(&files, &output)?;
    print_summary(&summary);
    eprintln!("Chart saved to: {}", output.display());

    Ok(())
}

fn print_summary(summary: &AccuracySummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Category", "Correct", "Total", "Accuracy"]);

    for entry in &summary.categories {
        table.add_row(vec![
            Cell::new(entry.category.label()),
            Cell::new(entry.correct),
            Cell::new(entry.total),
            Cell::new(entry.display_percentage()),
        ]);
    }

    println!("{table}");
}
