//! Run totals and console reporting

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;

use super::classify::Outcome;
use crate::common::paths::display_relative;

/// Counters accumulated over a run
///
/// Only units that reached execution are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_attempted: usize,
    pub total_succeeded: usize,
    pub by_outcome: BTreeMap<Outcome, usize>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        self.total_attempted += 1;
        if outcome == Outcome::Success {
            self.total_succeeded += 1;
        }
        *self.by_outcome.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    pub fn all_passed(&self) -> bool {
        self.total_succeeded == self.total_attempted
    }

    /// `K/N tests passed`
    pub fn headline(&self) -> String {
        format!(
            "{}/{} tests passed",
            self.total_succeeded, self.total_attempted
        )
    }
}

/// One executed unit as it appears in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub name: String,
    pub outcome: Outcome,
    pub exit_status: i32,
}

/// A unit that never reached execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub name: String,
    pub reason: String,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub records: Vec<UnitRecord>,
    pub skipped: Vec<SkippedUnit>,
    pub out_log: PathBuf,
    pub err_log: PathBuf,
    /// Set when writing the logs failed part way through the run
    pub log_error: Option<String>,
}

impl RunReport {
    pub fn print_summary(&self) {
        let headline = self.summary.headline();
        let headline = if self.summary.all_passed() {
            headline.green().bold()
        } else {
            headline.red().bold()
        };
        println!("\n{} {}", "Summary:".blue().bold(), headline);

        let mut breakdown = Vec::new();
        for outcome in [Outcome::DefectFailure, Outcome::AbnormalExit, Outcome::Timeout] {
            let n = self.summary.count(outcome);
            if n > 0 {
                breakdown.push(format!("{} {}", n, outcome.label().to_lowercase()));
            }
        }
        if !self.skipped.is_empty() {
            breakdown.push(format!("{} not built", self.skipped.len()));
        }
        if !breakdown.is_empty() {
            println!("  {}", breakdown.join(", ").dimmed());
        }

        println!(
            "{} {} {}",
            "Logs:".blue().bold(),
            display_relative(&self.out_log),
            display_relative(&self.err_log)
        );
        if let Some(error) = &self.log_error {
            println!("  {} {}", "incomplete:".red(), error);
        }
    }
}

/// Print the per-unit result line
pub fn print_outcome(name: &str, outcome: Outcome, exit_status: i32) {
    match outcome {
        Outcome::Success => println!("  {} {}", "✓ SUCCESS".green(), name),
        Outcome::DefectFailure => println!("  {} {}", "✗ FAILURE".red(), name),
        Outcome::AbnormalExit => println!(
            "  {} {} exited abnormally with code: {}",
            "! ABNORMAL".yellow(),
            name,
            exit_status
        ),
        Outcome::Timeout => println!("  {} {} was killed", "⏱ TIMEOUT".magenta(), name),
    }
}

/// Print a build failure diagnostic
pub fn print_build_failure(source: &str, diagnostic: &str) {
    eprintln!(
        "  {} compilation failed for {}:\n{}",
        "✗ ERROR".red().bold(),
        source,
        diagnostic.trim_end()
    );
}
