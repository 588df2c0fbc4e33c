//! Filesystem layout helpers
//!
//! The harness works relative to the directory it is started in, like the
//! test suite it drives.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::{Error, Result};

/// Config file picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "harness.toml";

/// Ensure a directory exists, creating parents as needed
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| Error::CreateDir {
        path: dir.display().to_string(),
        error: e.to_string(),
    })?;
    Ok(dir.to_path_buf())
}

/// Timestamp component of a run's log file names (`MM-DD-HH-MM`)
pub fn log_stamp(now: DateTime<Local>) -> String {
    now.format("%m-%d-%H-%M").to_string()
}

/// Paths of the stdout and stderr logs for a run started at `stamp`
pub fn log_paths(log_dir: &Path, stamp: &str) -> (PathBuf, PathBuf) {
    (
        log_dir.join(format!("log-{stamp}.out")),
        log_dir.join(format!("log-{stamp}.err")),
    )
}

/// Display a path relative to the working directory when it lies below it
pub fn display_relative(path: &Path) -> String {
    if path.is_relative() {
        return path.strip_prefix(".").unwrap_or(path).display().to_string();
    }

    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(|p| p.display().to_string()))
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_stamp_is_month_day_hour_minute() {
        let when = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
        assert_eq!(log_stamp(when), "03-07-09-05");
    }

    #[test]
    fn test_log_paths_share_stamp() {
        let (out, err) = log_paths(Path::new("log"), "03-07-09-05");
        assert_eq!(out, PathBuf::from("log/log-03-07-09-05.out"));
        assert_eq!(err, PathBuf::from("log/log-03-07-09-05.err"));
    }

    #[test]
    fn test_display_relative_strips_dot_prefix() {
        assert_eq!(display_relative(Path::new("./log/a.out")), "log/a.out");
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_dir(&nested).unwrap();
    }
}
