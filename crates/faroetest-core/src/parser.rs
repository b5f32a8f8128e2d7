//! JSON test case loader.
//!
//! Loads the per-category fixture files from the data directory and validates
//! them.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::EvalError;
use crate::model::{Category, TestCase};

/// Every category's test cases, iterated in run order.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    pub categories: BTreeMap<Category, Vec<TestCase>>,
}

impl TestSuite {
    pub fn cases(&self, category: Category) -> Option<&[TestCase]> {
        self.categories.get(&category).map(Vec::as_slice)
    }

    /// Keep only the given category.
    pub fn retain_category(&mut self, category: Category) {
        self.categories.retain(|c, _| *c == category);
    }

    pub fn total_cases(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Path of a category's fixture file under `data_dir`.
pub fn fixture_path(data_dir: &Path, category: Category) -> PathBuf {
    data_dir.join(format!("{}.json", category.file_stem()))
}

/// Load all three fixture files from `data_dir`.
pub fn load_test_suite(data_dir: &Path) -> Result<TestSuite> {
    let mut suite = TestSuite::default();
    for category in Category::ALL {
        let cases = load_category_file(&fixture_path(data_dir, category), category)?;
        tracing::debug!(category = %category, cases = cases.len(), "loaded test cases");
        suite.categories.insert(category, cases);
    }
    Ok(suite)
}

/// Load one fixture file.
pub fn load_category_file(path: &Path, category: Category) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test cases: {}", path.display()))?;

    parse_category_str(&content, category, path)
}

/// Parse a fixture from a string (useful for testing).
///
/// The fixture is a JSON object whose single relevant key is the category key,
/// holding an array of test cases.
pub fn parse_category_str(
    content: &str,
    category: Category,
    source_path: &Path,
) -> Result<Vec<TestCase>> {
    let mut parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let cases = parsed
        .remove(category.key())
        .ok_or_else(|| EvalError::MissingCategoryKey {
            path: source_path.display().to_string(),
            key: category.key().to_string(),
        })?;

    let cases: Vec<TestCase> = serde_json::from_value(cases).with_context(|| {
        format!(
            "invalid '{}' test cases in {}",
            category.key(),
            source_path.display()
        )
    })?;

    // `type` is a direction only in the translation fixture.
    if category == Category::TranslationAccuracy {
        for (index, case) in cases.iter().enumerate() {
            case.direction().map_err(|reason| EvalError::InvalidCase {
                category: category.key().to_string(),
                index,
                reason,
            })?;
        }
    }

    Ok(cases)
}

/// A warning from test suite validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub category: Category,
    /// Zero-based case index (if applicable).
    pub index: Option<usize>,
    pub message: String,
}

/// Validate a test suite for common issues.
pub fn validate_suite(suite: &TestSuite) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (&category, cases) in &suite.categories {
        let warn = |index: Option<usize>, message: String| ValidationWarning {
            category,
            index,
            message,
        };

        if cases.is_empty() {
            warnings.push(warn(None, "category has no test cases".into()));
            continue;
        }

        let mut seen_prompts = HashSet::new();
        for (i, case) in cases.iter().enumerate() {
            match case.prompt(category) {
                Ok(prompt) => {
                    if prompt.trim().is_empty() {
                        warnings.push(warn(Some(i), "prompt is empty".into()));
                    } else if !seen_prompts.insert(prompt.clone()) {
                        warnings.push(warn(Some(i), format!("duplicate prompt: {prompt}")));
                    }
                }
                Err(reason) => warnings.push(warn(Some(i), reason)),
            }

            let expected = case.expected_answer();
            if expected.trim().is_empty() {
                warnings.push(warn(Some(i), "expected_answer is empty".into()));
            } else if expected.trim() != expected {
                warnings.push(warn(
                    Some(i),
                    "expected_answer has surrounding whitespace and can never match a trimmed response"
                        .into(),
                ));
            }

            if case.system_prompt().trim().is_empty() {
                warnings.push(warn(Some(i), "system_prompt is empty".into()));
            }

            if category != Category::TranslationAccuracy && case.has_type() {
                warnings.push(warn(
                    Some(i),
                    "'type' is ignored outside translation cases".into(),
                ));
            }
        }
    }

    warnings
}
