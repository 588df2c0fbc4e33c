//! Test source discovery
//!
//! A test unit is any file in the source directory whose name starts with the
//! configured prefix and carries the configured extension.

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A discovered test program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    /// File stem of the source, unique within a run
    pub name: String,
    /// Source file handed to the compiler
    pub source_path: PathBuf,
    /// Where the built binary is written
    pub binary_path: PathBuf,
}

impl TestUnit {
    /// Describe a unit whose binary lands in `bin_dir`
    pub fn new(name: impl Into<String>, source_path: PathBuf, bin_dir: &Path) -> Self {
        let name = name.into();
        let binary_path = bin_dir.join(&name);
        Self {
            name,
            source_path,
            binary_path,
        }
    }
}

/// Naming convention used to select test sources
#[derive(Debug, Clone)]
pub struct SourcePattern {
    pub prefix: String,
    pub extension: String,
}

impl SourcePattern {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Test name for a matching file name, `None` if it does not match
    pub fn unit_name(&self, file_name: &str) -> Option<String> {
        let path = Path::new(file_name);
        if path.extension()?.to_str()? != self.extension {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        stem.starts_with(&self.prefix).then(|| stem.to_string())
    }
}

/// Enumerate test units in `source_dir`, sorted by file name
///
/// A missing source directory yields no units, like an empty one.
pub fn discover(
    source_dir: &Path,
    pattern: &SourcePattern,
    bin_dir: &Path,
) -> Result<Vec<TestUnit>> {
    let entries = match std::fs::read_dir(source_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("source directory {} does not exist", source_dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(Error::Discovery {
                path: source_dir.display().to_string(),
                error: e.to_string(),
            })
        }
    };

    let mut found: Vec<(String, String)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Discovery {
            path: source_dir.display().to_string(),
            error: e.to_string(),
        })?;

        let is_file = entry.file_type().map(|t| !t.is_dir()).unwrap_or(false);
        if !is_file {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            tracing::debug!("skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };

        if let Some(name) = pattern.unit_name(file_name) {
            found.push((file_name.to_string(), name));
        }
    }

    found.sort();

    Ok(found
        .into_iter()
        .map(|(file_name, name)| TestUnit::new(name, source_dir.join(file_name), bin_dir))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn pattern() -> SourcePattern {
        SourcePattern::new("test", "c")
    }

    #[test]
    fn test_unit_name_matching() {
        let p = pattern();
        assert_eq!(p.unit_name("test1.c"), Some("test1".to_string()));
        assert_eq!(p.unit_name("test.c"), Some("test".to_string()));
        assert_eq!(p.unit_name("please-update-me.c"), None);
        assert_eq!(p.unit_name("test1.h"), None);
        assert_eq!(p.unit_name("test1"), None);
        assert_eq!(p.unit_name("mytest1.c"), None);
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["test3.c", "test10.c", "test1.c", "helper.c", "test2.h", "notes.txt"] {
            fs::write(tmp.path().join(name), "int main(void){return 0;}\n").unwrap();
        }
        fs::create_dir(tmp.path().join("test_dir.c")).unwrap();

        let bin = Path::new("bin");
        let units = discover(tmp.path(), &pattern(), bin).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();

        // Lexicographic, not numeric
        assert_eq!(names, vec!["test1", "test10", "test3"]);
        assert_eq!(units[0].source_path, tmp.path().join("test1.c"));
        assert_eq!(units[0].binary_path, PathBuf::from("bin/test1"));
    }

    #[test]
    fn test_discover_is_stable() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["test_b.c", "test_a.c", "test_c.c"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }
        let first = discover(tmp.path(), &pattern(), Path::new("bin")).unwrap();
        let second = discover(tmp.path(), &pattern(), Path::new("bin")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_discover_empty_and_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover(tmp.path(), &pattern(), Path::new("bin")).unwrap().is_empty());
        assert!(discover(&tmp.path().join("missing"), &pattern(), Path::new("bin"))
            .unwrap()
            .is_empty());
    }
}
