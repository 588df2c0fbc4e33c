//! Instrumentation injection strategies
//!
//! The runtime under test is a shared library. How it gets into a test
//! binary's process depends on the platform loader, so the execution step
//! only asks an [`Injection`] for the environment to add.

use std::path::{Path, PathBuf};

/// Loader variable used for library interposition on this platform
#[cfg(target_os = "macos")]
pub const PLATFORM_PRELOAD_VAR: &str = "DYLD_INSERT_LIBRARIES";
#[cfg(not(target_os = "macos"))]
pub const PLATFORM_PRELOAD_VAR: &str = "LD_PRELOAD";

/// Gets an instrumentation component loaded into a child process
pub trait Injection: Send + Sync {
    /// Environment variables that make the loader pull the component in
    fn env(&self) -> Vec<(String, String)>;

    /// Short human description for logs
    fn describe(&self) -> String;

    /// The injected library, if any
    fn library(&self) -> Option<&Path> {
        None
    }
}

/// Loader interposition through an environment variable
#[derive(Debug, Clone)]
pub struct Preload {
    pub variable: String,
    pub library: PathBuf,
}

impl Preload {
    pub fn new(variable: impl Into<String>, library: impl Into<PathBuf>) -> Self {
        Self {
            variable: variable.into(),
            library: library.into(),
        }
    }

    /// Use the platform's preload variable
    pub fn platform(library: impl Into<PathBuf>) -> Self {
        Self::new(PLATFORM_PRELOAD_VAR, library)
    }
}

impl Injection for Preload {
    fn env(&self) -> Vec<(String, String)> {
        vec![(
            self.variable.clone(),
            self.library.to_string_lossy().into_owned(),
        )]
    }

    fn describe(&self) -> String {
        format!("{}={}", self.variable, self.library.display())
    }

    fn library(&self) -> Option<&Path> {
        Some(self.library.as_path())
    }
}

/// Run binaries as built, without instrumentation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInjection;

impl Injection for NoInjection {
    fn env(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn describe(&self) -> String {
        "not instrumented".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preload_env() {
        let inj = Preload::new("LD_PRELOAD", "../src/debug/libruntime.so");
        assert_eq!(
            inj.env(),
            vec![("LD_PRELOAD".to_string(), "../src/debug/libruntime.so".to_string())]
        );
        assert_eq!(inj.describe(), "LD_PRELOAD=../src/debug/libruntime.so");
        assert_eq!(inj.library(), Some(Path::new("../src/debug/libruntime.so")));
    }

    #[test]
    fn test_no_injection_is_empty() {
        assert!(NoInjection.env().is_empty());
        assert!(NoInjection.library().is_none());
    }
}
