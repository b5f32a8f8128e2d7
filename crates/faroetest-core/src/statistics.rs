//! Scoring and aggregate accuracy.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::{Category, TestResult};

/// Case-insensitive exact match. No trimming, no partial credit.
pub fn is_correct(response: &str, expected_answer: &str) -> bool {
    response.to_lowercase() == expected_answer.to_lowercase()
}

/// Fraction of correct results, in `[0, 1]`.
///
/// An empty slice is an error rather than 0 or NaN.
pub fn accuracy(results: &[TestResult]) -> Result<f64, EvalError> {
    let total = results.len();
    if total == 0 {
        return Err(EvalError::EmptyResults("empty result set".into()));
    }
    let correct = results.iter().filter(|r| r.is_correct).count();
    Ok(correct as f64 / total as f64)
}

/// Accuracy of a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: Category,
    pub correct: usize,
    pub total: usize,
    /// `100 * correct / total`.
    pub percentage: f64,
}

impl CategoryAccuracy {
    /// Tally a category's results. Fails on an empty result set.
    pub fn from_results(category: Category, results: &[TestResult]) -> Result<Self, EvalError> {
        if results.is_empty() {
            return Err(EvalError::EmptyResults(category.key().to_string()));
        }
        let correct = results.iter().filter(|r| r.is_correct).count();
        let total = results.len();
        Ok(Self {
            category,
            correct,
            total,
            percentage: 100.0 * correct as f64 / total as f64,
        })
    }

    /// The percentage at display granularity, e.g. `42.86%`.
    pub fn display_percentage(&self) -> String {
        format_percentage(self.percentage)
    }
}

/// Per-category accuracy, in the order the categories were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub categories: Vec<CategoryAccuracy>,
}

impl AccuracySummary {
    pub fn push(&mut self, entry: CategoryAccuracy) {
        self.categories.push(entry);
    }

    /// Percentage for a category, if it was scored.
    pub fn get(&self, category: Category) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.percentage)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

/// Format a percentage in `[0, 100]` to two decimals.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}
