//! faroetest-core — Core data model, test runner, and scoring.
//!
//! This crate defines the test case model, the provider trait, the sequential
//! test runner, results persistence, and accuracy scoring that the rest of
//! faroetest builds on.

pub mod error;
pub mod model;
pub mod parser;
pub mod results;
pub mod runner;
pub mod statistics;
pub mod traits;
