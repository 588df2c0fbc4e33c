//! Use-after-free regression harness
//!
//! Builds every `test*.c` in the suite, runs it with the detection runtime
//! preloaded and reports how many passed.

use clap::Parser;
use harness::commands::Cli;
use harness::common::logging;
use harness::pipeline::{run, TokioRunner};

/// Some executed test did not succeed
const EXIT_TESTS_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let result = match cli.resolve_config() {
        Ok(config) => run(&config, &TokioRunner).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            report.print_summary();
            if report.log_error.is_some() {
                std::process::exit(1);
            }
            if !report.summary.all_passed() {
                std::process::exit(EXIT_TESTS_FAILED);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
