//! CLI definition
//!
//! Every flag is optional: running with no arguments processes the whole
//! suite with the settings from `harness.toml` or the defaults.

use clap::Parser;
use std::path::PathBuf;

use crate::common::{Config, Result};

#[derive(Parser, Debug, Default)]
#[command(name = "uaf-harness", about = "Build and run use-after-free regression tests")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./harness.toml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory scanned for test sources
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Compiler used to build test sources
    #[arg(long)]
    pub compiler: Option<String>,

    /// Per-test timeout in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Run test binaries without injecting the runtime
    #[arg(long)]
    pub no_instrument: bool,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Load the configuration and apply command line overrides
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.source_dir {
            config.paths.source_dir = dir.clone();
        }
        if let Some(compiler) = &self.compiler {
            config.toolchain.compiler = compiler.clone();
        }
        if let Some(secs) = self.timeout {
            config.execution.timeout_secs = secs;
        }
        if self.no_instrument {
            config.execution.no_instrument = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["uaf-harness"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.no_instrument);
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "uaf-harness",
            "--compiler",
            "gcc",
            "--timeout",
            "0",
            "--no-instrument",
            "--source-dir",
            "cases",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.toolchain.compiler, "gcc");
        assert_eq!(config.execution.timeout(), None);
        assert!(config.execution.no_instrument);
        assert_eq!(config.paths.source_dir, PathBuf::from("cases"));
    }
}
