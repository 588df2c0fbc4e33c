//! Error types for the harness
//!
//! Only conditions that stop a run are errors. A test program that fails to
//! compile, crashes or trips the detector is a result, not an `Error`.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Log Artifact Errors ===
    #[error("Unable to open log file {path}: {source}")]
    LogOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write log file {path}: {source}")]
    LogWrite {
        path: String,
        #[source]
        source: io::Error,
    },

    // === Filesystem Errors ===
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: String, error: String },

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to scan source directory '{path}': {error}")]
    Discovery { path: String, error: String },

    // === Process Errors ===
    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a log open error for the given artifact path
    pub fn log_open(path: &Path, source: io::Error) -> Self {
        Self::LogOpen {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a log write error for the given artifact path
    pub fn log_write(path: &Path, source: io::Error) -> Self {
        Self::LogWrite {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a spawn error for a program that could not be started
    pub fn spawn(program: &Path, error: impl ToString) -> Self {
        Self::Spawn {
            program: program.display().to_string(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_open_message_names_path() {
        let err = Error::log_open(
            Path::new("log/log-01-02-03-04.out"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("log/log-01-02-03-04.out"));
        assert!(msg.contains("denied"));
    }
}
