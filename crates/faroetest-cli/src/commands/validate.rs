//! The `faroetest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use faroetest_core::parser;
use faroetest_providers::config::load_config_from;

pub fn execute(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.data_dir,
    };
    tracing::debug!(data_dir = %data_dir.display(), "validating fixtures");

    let suite = parser::load_test_suite(&data_dir)?;

    for (category, cases) in &suite.categories {
        println!("{}: {} cases", category.title(), cases.len());
    }

    let warnings = parser::validate_suite(&suite);
    for w in &warnings {
        let prefix = w
            .index
            .map(|i| format!("  [{}#{}]", w.category.label(), i + 1))
            .unwrap_or_else(|| format!("  [{}]", w.category.label()));
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All test cases valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
