//! Configuration file handling

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::DEFAULT_CONFIG_FILE;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Which files count as test sources
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Compiler invocation
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Instrumented execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Scripted stdin per test name, layered over the built-in table
    #[serde(default)]
    pub fixtures: BTreeMap<String, String>,
}

/// Directory layout, relative to the working directory
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Directory scanned for test sources
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Directory passed to the compiler as an include path
    #[serde(default = "default_header_dir")]
    pub header_dir: PathBuf,

    /// Where built test binaries are written
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Where per-run log files are written
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Shared library injected into every test binary
    #[serde(default = "default_runtime")]
    pub runtime: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            header_dir: default_header_dir(),
            bin_dir: default_bin_dir(),
            log_dir: default_log_dir(),
            runtime: default_runtime(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./src")
}
fn default_header_dir() -> PathBuf {
    PathBuf::from("../src/")
}
fn default_bin_dir() -> PathBuf {
    PathBuf::from("./bin")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("./log")
}
fn default_runtime() -> PathBuf {
    PathBuf::from("../src/debug/libruntime.so")
}

/// Naming convention for test sources
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Required file name prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Required file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            extension: default_extension(),
        }
    }
}

fn default_prefix() -> String {
    "test".to_string()
}
fn default_extension() -> String {
    "c".to_string()
}

/// Compiler settings
#[derive(Debug, Deserialize, Clone)]
pub struct ToolchainConfig {
    /// Compiler executable (name on PATH or a path)
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Flags placed before the source file
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            flags: default_flags(),
        }
    }
}

fn default_compiler() -> String {
    "clang".to_string()
}
fn default_flags() -> Vec<String> {
    vec!["-ggdb3".to_string()]
}

/// Execution settings
#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Per-test wall clock limit in seconds, 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Text the runtime writes to stderr when it catches a use-after-free
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Loader variable used for injection; platform default when unset
    #[serde(default)]
    pub preload_var: Option<String>,

    /// Run test binaries without the runtime injected
    #[serde(default)]
    pub no_instrument: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            marker: default_marker(),
            preload_var: None,
            no_instrument: false,
        }
    }
}

fn default_timeout() -> u64 {
    60
}
fn default_marker() -> String {
    "REPORT_UAF_OCCURED_REPORT".to_string()
}

impl ExecutionConfig {
    /// The configured timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `harness.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.toolchain.compiler.trim().is_empty() {
            return Err(Error::Config("toolchain.compiler must not be empty".to_string()));
        }
        if self.execution.marker.is_empty() {
            return Err(Error::Config("execution.marker must not be empty".to_string()));
        }
        if self.discovery.extension.starts_with('.') {
            return Err(Error::Config(format!(
                "discovery.extension should not include the dot: '{}'",
                self.discovery.extension
            )));
        }
        Ok(())
    }
}
