//! Per-run log artifacts
//!
//! Each run owns two files, one collecting every test's stdout and one its
//! stderr. Sections are appended in execution order, each behind a banner.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::common::paths::log_paths;
use crate::common::{Error, Result};

const BANNER_FILL: &str = "####################";

/// Banner line that opens a test's section
pub fn banner(name: &str) -> String {
    format!("{BANNER_FILL} {name} {BANNER_FILL}\n")
}

/// The stdout/stderr log pair of a run
pub struct RunLogs<W: Write> {
    out: W,
    err: W,
    out_path: PathBuf,
    err_path: PathBuf,
}

impl RunLogs<BufWriter<File>> {
    /// Create (or truncate) `log-<stamp>.out` and `log-<stamp>.err` in `dir`
    pub fn create(dir: &Path, stamp: &str) -> Result<Self> {
        let (out_path, err_path) = log_paths(dir, stamp);
        let out = File::create(&out_path).map_err(|e| Error::log_open(&out_path, e))?;
        let err = File::create(&err_path).map_err(|e| Error::log_open(&err_path, e))?;
        Ok(Self::new(BufWriter::new(out), BufWriter::new(err), out_path, err_path))
    }
}

impl<W: Write> RunLogs<W> {
    pub fn new(out: W, err: W, out_path: PathBuf, err_path: PathBuf) -> Self {
        Self {
            out,
            err,
            out_path,
            err_path,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    pub fn err_path(&self) -> &Path {
        &self.err_path
    }

    /// Append one test's captured streams and flush both logs
    pub fn append(&mut self, name: &str, stdout: &str, stderr: &str) -> Result<()> {
        let header = banner(name);

        write_section(&mut self.out, &header, stdout)
            .map_err(|e| Error::log_write(&self.out_path, e))?;
        write_section(&mut self.err, &header, stderr)
            .map_err(|e| Error::log_write(&self.err_path, e))?;
        Ok(())
    }

    /// Flush and hand back the writers
    pub fn finish(mut self) -> Result<(W, W)> {
        self.out
            .flush()
            .map_err(|e| Error::log_write(&self.out_path, e))?;
        self.err
            .flush()
            .map_err(|e| Error::log_write(&self.err_path, e))?;
        Ok((self.out, self.err))
    }
}

fn write_section<W: Write>(w: &mut W, header: &str, body: &str) -> std::io::Result<()> {
    w.write_all(header.as_bytes())?;
    w.write_all(body.as_bytes())?;
    w.flush()
}
