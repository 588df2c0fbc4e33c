//! Use-after-free regression harness
//!
//! This library drives a suite of small C programs through compilation and
//! instrumented execution, and classifies each run as a success, a detected
//! defect or an abnormal exit.

pub mod commands;
pub mod common;
pub mod pipeline;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use pipeline::{Outcome, RunReport, RunSummary};
