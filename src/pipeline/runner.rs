//! Run loop
//!
//! Discovery feeds units one at a time through build, instrumented
//! execution, classification and logging. Nothing runs in parallel.

use chrono::Local;

use super::build::{BuildOutcome, Toolchain};
use super::classify::classify;
use super::discovery::{discover, SourcePattern};
use super::execute::Executor;
use super::fixtures::FixtureRegistry;
use super::inject::{Injection, NoInjection, Preload, PLATFORM_PRELOAD_VAR};
use super::logs::RunLogs;
use super::process::ProcessRunner;
use super::report::{self, RunReport, RunSummary, SkippedUnit, UnitRecord};
use crate::common::paths::{ensure_dir, log_stamp};
use crate::common::{Config, Result};

/// Injection strategy selected by the configuration
pub fn injection_for(config: &Config) -> Box<dyn Injection> {
    if config.execution.no_instrument {
        return Box::new(NoInjection);
    }
    let variable = config
        .execution
        .preload_var
        .clone()
        .unwrap_or_else(|| PLATFORM_PRELOAD_VAR.to_string());
    Box::new(Preload::new(variable, config.paths.runtime.clone()))
}

/// Run every discovered test, stamping logs with the current local time
pub async fn run(config: &Config, runner: &dyn ProcessRunner) -> Result<RunReport> {
    run_with_stamp(config, runner, &log_stamp(Local::now())).await
}

/// Run every discovered test, writing `log-<stamp>.{out,err}`
pub async fn run_with_stamp(
    config: &Config,
    runner: &dyn ProcessRunner,
    stamp: &str,
) -> Result<RunReport> {
    let paths = &config.paths;
    ensure_dir(&paths.bin_dir)?;
    ensure_dir(&paths.log_dir)?;

    // Both logs must open before anything is built
    let mut logs = RunLogs::create(&paths.log_dir, stamp)?;

    let injection = injection_for(config);
    preflight(config, injection.as_ref());

    let fixtures = FixtureRegistry::with_builtin(&config.fixtures);
    let toolchain = Toolchain::from_config(&config.toolchain, paths);
    let executor = Executor::new(injection.as_ref(), config.execution.timeout());
    let pattern = SourcePattern::new(&config.discovery.prefix, &config.discovery.extension);

    let units = discover(&paths.source_dir, &pattern, &paths.bin_dir)?;
    tracing::info!(
        "found {} test(s) in {} ({})",
        units.len(),
        paths.source_dir.display(),
        injection.describe()
    );

    let mut summary = RunSummary::default();
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut log_error: Option<String> = None;

    for unit in &units {
        tracing::info!(
            "compile {} -> {}",
            unit.source_path.display(),
            unit.binary_path.display()
        );

        match toolchain.build(runner, unit).await {
            BuildOutcome::Built => {}
            BuildOutcome::Failed { status, diagnostic } => {
                report::print_build_failure(&unit.source_path.display().to_string(), &diagnostic);
                skipped.push(SkippedUnit {
                    name: unit.name.clone(),
                    reason: format!("compiler exited with {}", status),
                });
                continue;
            }
        }

        tracing::info!("running {}...", unit.name);
        let input = fixtures.lookup(&unit.name);
        let result = match executor.execute(runner, unit, input).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("{}: {}", unit.name, e);
                skipped.push(SkippedUnit {
                    name: unit.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // A broken log stops logging, not testing
        if log_error.is_none() {
            if let Err(e) = logs.append(&unit.name, &result.stdout, &result.stderr) {
                tracing::error!("{}; output of later tests is not logged", e);
                log_error = Some(e.to_string());
            }
        }

        let outcome = classify(&result, &config.execution.marker);
        report::print_outcome(&unit.name, outcome, result.exit_status);
        summary.record(outcome);
        records.push(UnitRecord {
            name: unit.name.clone(),
            outcome,
            exit_status: result.exit_status,
        });
    }

    let out_log = logs.out_path().to_path_buf();
    let err_log = logs.err_path().to_path_buf();
    if let Err(e) = logs.finish() {
        if log_error.is_none() {
            tracing::error!("{}", e);
            log_error = Some(e.to_string());
        }
    }

    Ok(RunReport {
        summary,
        records,
        skipped,
        out_log,
        err_log,
        log_error,
    })
}

/// Warn about setup problems that would otherwise show up as odd results
fn preflight(config: &Config, injection: &dyn Injection) {
    if let Some(library) = injection.library() {
        if !library.exists() {
            tracing::warn!(
                "runtime library {} not found; test binaries will run uninstrumented",
                library.display()
            );
        }
    }

    if which::which(&config.toolchain.compiler).is_err() {
        tracing::warn!(
            "compiler '{}' not found on PATH; every build will fail",
            config.toolchain.compiler
        );
    }
}
