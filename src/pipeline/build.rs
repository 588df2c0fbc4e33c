//! Build step: compile one test source against the shared headers

use std::path::{Path, PathBuf};

use super::discovery::TestUnit;
use super::process::{Invocation, ProcessRunner};
use crate::common::config::{PathsConfig, ToolchainConfig};

/// Result of compiling a single unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Binary written to the unit's `binary_path`
    Built,
    /// Compiler failed or could not be started
    Failed { status: i32, diagnostic: String },
}

/// Compiler command line shared by every unit
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub compiler: PathBuf,
    pub flags: Vec<String>,
    pub header_dir: PathBuf,
}

impl Toolchain {
    pub fn from_config(toolchain: &ToolchainConfig, paths: &PathsConfig) -> Self {
        Self {
            compiler: PathBuf::from(&toolchain.compiler),
            flags: toolchain.flags.clone(),
            header_dir: paths.header_dir.clone(),
        }
    }

    /// `<compiler> <flags> <source> -I<headers> -o <binary>`
    pub fn invocation(&self, unit: &TestUnit) -> Invocation {
        Invocation::new(&self.compiler)
            .args(self.flags.iter().cloned())
            .arg(path_arg(&unit.source_path))
            .arg(format!("-I{}", path_arg(&self.header_dir)))
            .arg("-o")
            .arg(path_arg(&unit.binary_path))
    }

    /// Compile `unit`; failures are returned, never raised
    pub async fn build(&self, runner: &dyn ProcessRunner, unit: &TestUnit) -> BuildOutcome {
        let invocation = self.invocation(unit);
        tracing::debug!("$ {}", invocation.command_line());

        match runner.run(&invocation).await {
            Ok(output) if output.success() => {
                if !output.stderr.trim().is_empty() {
                    tracing::debug!("{} compiler output:\n{}", unit.name, output.stderr);
                }
                BuildOutcome::Built
            }
            Ok(output) => BuildOutcome::Failed {
                status: output.status,
                diagnostic: output.stderr,
            },
            Err(e) => BuildOutcome::Failed {
                status: -1,
                diagnostic: e.to_string(),
            },
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_layout() {
        let toolchain =
            Toolchain::from_config(&ToolchainConfig::default(), &PathsConfig::default());
        let unit = TestUnit::new("test1", PathBuf::from("./src/test1.c"), Path::new("./bin"));

        let inv = toolchain.invocation(&unit);
        assert_eq!(inv.program, PathBuf::from("clang"));
        assert_eq!(
            inv.args,
            vec!["-ggdb3", "./src/test1.c", "-I../src/", "-o", "./bin/test1"]
        );
        assert!(inv.stdin.is_none());
        assert!(inv.env.is_empty());
    }
}
