//! Timestamped JSON persistence for test results.
//!
//! Each completed category run is written to
//! `<dir>/<category>_results_<YYYYMMDD_HHMMSS>.json`. A category that aborts
//! part-way leaves its completed cases in a `<category>_partial_<...>.json`
//! checkpoint, which result discovery ignores.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::EvalError;
use crate::model::{Category, TestResult};

/// Timestamp format embedded in results file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A directory of results files.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    dir: PathBuf,
}

impl ResultsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a completed run for `category` at `timestamp` is written to.
    pub fn results_path(&self, category: Category, timestamp: DateTime<Local>) -> PathBuf {
        self.dir.join(format!(
            "{}_results_{}.json",
            category.key(),
            timestamp.format(TIMESTAMP_FORMAT)
        ))
    }

    /// Path a partial run for `category` at `timestamp` is checkpointed to.
    pub fn checkpoint_path(&self, category: Category, timestamp: DateTime<Local>) -> PathBuf {
        self.dir.join(format!(
            "{}_partial_{}.json",
            category.key(),
            timestamp.format(TIMESTAMP_FORMAT)
        ))
    }

    /// Write a completed category run, creating the directory if needed.
    pub fn save(&self, category: Category, results: &[TestResult]) -> Result<PathBuf> {
        let path = self.results_path(category, Local::now());
        write_pretty_json(&path, results)?;
        Ok(path)
    }

    /// Write the cases a failed category completed before it aborted.
    pub fn save_checkpoint(&self, category: Category, results: &[TestResult]) -> Result<PathBuf> {
        let path = self.checkpoint_path(category, Local::now());
        write_pretty_json(&path, results)?;
        Ok(path)
    }

    /// The most recent completed results file for `category`, if any.
    ///
    /// Timestamps sort lexicographically, so the greatest file name wins.
    pub fn latest(&self, category: Category) -> Result<Option<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(None);
        }

        let prefix = format!("{}_results_", category.key());
        let mut latest: Option<PathBuf> = None;

        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read directory: {}", self.dir.display()))?
        {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(&prefix) || !name.ends_with(".json") {
                continue;
            }
            let newer = latest
                .as_ref()
                .and_then(|p| p.file_name())
                .map_or(true, |current| OsStr::new(name) > current);
            if newer {
                latest = Some(path);
            }
        }

        Ok(latest)
    }

    /// Like [`ResultsStore::latest`], but a missing file is an error.
    pub fn require_latest(&self, category: Category) -> Result<PathBuf> {
        self.latest(category)?.ok_or_else(|| {
            EvalError::NoResultsFile {
                category: category.key().to_string(),
                dir: self.dir.display().to_string(),
            }
            .into()
        })
    }
}

/// Load a results file.
pub fn load_results(path: &Path) -> Result<Vec<TestResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read results from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse results JSON: {}", path.display()))
}

/// Pretty-print with four-space indentation, non-ASCII left unescaped.
fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("failed to serialize results")?;

    std::fs::write(path, buf)
        .with_context(|| format!("failed to write results to {}", path.display()))?;
    Ok(())
}
