//! The `faroetest init` command.

use std::path::Path;

use anyhow::{Context, Result};

const FIXTURES: [(&str, &str); 3] = [
    (
        "data/test_grammar_rules.json",
        include_str!("../../../../data/test_grammar_rules.json"),
    ),
    (
        "data/test_morphological_understanding.json",
        include_str!("../../../../data/test_morphological_understanding.json"),
    ),
    (
        "data/test_translation_accuracy.json",
        include_str!("../../../../data/test_translation_accuracy.json"),
    ),
];

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("faroetest.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("data").context("failed to create data directory")?;
    for (path, content) in FIXTURES {
        write_if_missing(Path::new(path), content)?;
    }

    println!("\nNext steps:");
    println!("  1. Set OPENAI_API_KEY (or add it to a .env file)");
    println!("  2. Run: faroetest validate");
    println!("  3. Run: faroetest run");
    println!("  4. Run: faroetest plot");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# faroetest configuration

# The key is read from OPENAI_API_KEY; a ${VAR} reference works here too.
# api_key = "${OPENAI_API_KEY}"
# base_url = "https://api.openai.com"

model = "gpt-4o"
# temperature = 0.0
# max_tokens = 64
# timeout_secs = 120

# Retries on transient errors (rate limits, timeouts). 0 aborts on the first failure.
max_retries = 0
retry_delay_ms = 1000

data_dir = "data"
results_dir = "results"
"#;
