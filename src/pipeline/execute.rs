//! Instrumented execution of a built test binary

use std::time::Duration;

use super::discovery::TestUnit;
use super::inject::Injection;
use super::process::{Invocation, ProcessRunner};
use crate::common::Result;

/// Captured run of one test binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub unit: TestUnit,
    /// Exit code, or the negated signal number
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Runs binaries with the instrumentation component loaded
pub struct Executor<'a> {
    injection: &'a dyn Injection,
    timeout: Option<Duration>,
}

impl<'a> Executor<'a> {
    pub fn new(injection: &'a dyn Injection, timeout: Option<Duration>) -> Self {
        Self { injection, timeout }
    }

    pub fn invocation(&self, unit: &TestUnit, input: Option<&str>) -> Invocation {
        Invocation::new(&unit.binary_path)
            .envs(self.injection.env())
            .stdin(input.map(str::to_string))
            .timeout(self.timeout)
    }

    /// Run `unit` once, feeding `input` to its stdin
    ///
    /// Only a failure to start the binary is an error; crashes and non-zero
    /// exits are captured in the result.
    pub async fn execute(
        &self,
        runner: &dyn ProcessRunner,
        unit: &TestUnit,
        input: Option<&str>,
    ) -> Result<ExecutionResult> {
        let invocation = self.invocation(unit, input);
        tracing::debug!(
            "$ {} ({}, stdin: {} bytes)",
            invocation.command_line(),
            self.injection.describe(),
            input.map(str::len).unwrap_or(0)
        );

        let output = runner.run(&invocation).await?;

        Ok(ExecutionResult {
            unit: unit.clone(),
            exit_status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
        })
    }
}
