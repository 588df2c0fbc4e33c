//! Outcome classification
//!
//! Pure function of the captured run. Order matters: a detection (crash or
//! marker) wins over a clean exit status, and over a timeout.

use std::fmt;

use super::execute::ExecutionResult;
use super::process::SIGSEGV_STATUS;

/// Classification of one executed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    /// Exited 0 without reporting a use-after-free
    Success,
    /// Crashed with SIGSEGV or the runtime printed its marker
    DefectFailure,
    /// Any other non-zero termination
    AbnormalExit,
    /// Killed after exceeding the execution timeout
    Timeout,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::DefectFailure => "FAILURE",
            Outcome::AbnormalExit => "ABNORMAL",
            Outcome::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision table over (exit status, timeout flag, stderr)
pub fn classify_parts(exit_status: i32, timed_out: bool, stderr: &str, marker: &str) -> Outcome {
    if exit_status == SIGSEGV_STATUS || (!marker.is_empty() && stderr.contains(marker)) {
        Outcome::DefectFailure
    } else if timed_out {
        Outcome::Timeout
    } else if exit_status == 0 {
        Outcome::Success
    } else {
        Outcome::AbnormalExit
    }
}

/// Classify a captured run
pub fn classify(result: &ExecutionResult, marker: &str) -> Outcome {
    classify_parts(result.exit_status, result.timed_out, &result.stderr, marker)
}
