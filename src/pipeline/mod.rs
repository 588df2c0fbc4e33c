//! Use-after-free test harness
//!
//! Discovers test programs, builds them against the shared headers, runs
//! each with the detection runtime injected and classifies what happened.
//! Everything is strictly sequential.

pub mod build;
pub mod classify;
pub mod discovery;
pub mod execute;
pub mod fixtures;
pub mod inject;
pub mod logs;
pub mod process;
pub mod report;
mod runner;

pub use classify::{classify, Outcome};
pub use discovery::TestUnit;
pub use execute::ExecutionResult;
pub use process::{Invocation, ProcessOutput, ProcessRunner, TokioRunner};
pub use report::{RunReport, RunSummary};
pub use runner::{injection_for, run, run_with_stamp};
