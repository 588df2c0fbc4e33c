//! Scripted stdin for interactive test programs

use std::collections::BTreeMap;

/// Immutable map from test name to the literal text fed to its stdin
#[derive(Debug, Clone, Default)]
pub struct FixtureRegistry {
    scripts: BTreeMap<String, String>,
}

impl FixtureRegistry {
    /// Built-in fixtures with `overrides` layered on top
    pub fn with_builtin(overrides: &BTreeMap<String, String>) -> Self {
        let mut scripts = builtin();
        scripts.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { scripts }
    }

    /// Script for `name`, `None` when the test takes no input
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}

fn builtin() -> BTreeMap<String, String> {
    let mut scripts = BTreeMap::new();
    // auth / reset / service overflow / login sequence
    scripts.insert(
        "test3".to_string(),
        format!("auth admin\nreset\nservice {}\nlogin\n", "A".repeat(28)),
    );
    scripts
}
