//! Read-only snapshot of the environment the checks inspect
//!
//! The snapshot is taken once at startup, after merging the optional `.env`
//! file, and passed explicitly to every check.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Environment variables visible to the checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Captures the process environment merged with a dotenv file
    ///
    /// With `env_file` unset, `.env` is searched for in the current
    /// directory and its parents. Values already present in the process
    /// environment take precedence over the file. A missing file is not an
    /// error, and malformed lines are skipped with a warning.
    pub fn load(env_file: Option<&Path>) -> Result<Self, dotenvy::Error> {
        let opened = match env_file {
            Some(path) => dotenvy::from_path_iter(path),
            None => dotenvy::dotenv_iter(),
        };
        let source = env_file.map_or_else(|| ".env".to_string(), |p| p.display().to_string());

        let mut snapshot = Self::new();
        match opened {
            Ok(iter) => {
                for item in iter {
                    match item {
                        Ok((key, value)) => {
                            snapshot.vars.insert(key, value);
                        }
                        Err(dotenvy::Error::Io(e)) => return Err(dotenvy::Error::Io(e)),
                        Err(e) => warn!(path = %source, error = %e, "Skipping malformed env line"),
                    }
                }
                debug!(path = %source, count = snapshot.len(), "Loaded env file");
            }
            Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %source, "No env file found");
            }
            Err(e) => return Err(e),
        }

        snapshot.vars.extend(Self::from_process().vars);
        Ok(snapshot)
    }

    /// Returns the value of a variable, if set
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns the value of a variable if it is set to a non-empty string
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Returns a copy of this snapshot with `key` set to `value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Returns a copy of this snapshot with `key` removed
    pub fn without(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_get_and_non_empty() {
        let env: EnvSnapshot = [("A", "1"), ("B", "")].into_iter().collect();
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("B"), Some(""));
        assert_eq!(env.non_empty("B"), None);
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn test_with_and_without() {
        let env = EnvSnapshot::new().with("A", "1").with("B", "2").without("A");
        assert_eq!(env.get("A"), None);
        assert_eq!(env.get("B"), Some("2"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_load_reads_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LAB_PREFLIGHT_TEST_ONLY_KEY=from_file").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "LAB_PREFLIGHT_TEST_QUOTED=\"quoted value\"").unwrap();

        let env = EnvSnapshot::load(Some(file.path())).unwrap();
        assert_eq!(env.get("LAB_PREFLIGHT_TEST_ONLY_KEY"), Some("from_file"));
        assert_eq!(env.get("LAB_PREFLIGHT_TEST_QUOTED"), Some("quoted value"));
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = EnvSnapshot::load(Some(&dir.path().join(".env"))).unwrap();
        assert_eq!(env, EnvSnapshot::from_process());
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LAB_PREFLIGHT_TEST_DB_HOST=db.lab").unwrap();
        writeln!(file, "this line is not an assignment").unwrap();
        writeln!(file, "LAB_PREFLIGHT_TEST_DB_NAME=lab").unwrap();

        let env = EnvSnapshot::load(Some(file.path())).unwrap();
        assert_eq!(env.get("LAB_PREFLIGHT_TEST_DB_HOST"), Some("db.lab"));
        assert_eq!(env.get("LAB_PREFLIGHT_TEST_DB_NAME"), Some("lab"));
    }
}
