//! Configuration for the linklock CLI.
//!
//! Configuration lives in an optional YAML file. Every field has a default,
//! so an absent or empty file is valid; command-line flags override whatever
//! the file says. The library entry points take their parameters explicitly
//! and never read this.

use crate::error::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "LINKLOCK_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra acquisition attempts beyond the first.
    pub retries: u32,

    /// Append acquire/release audit events to this NDJSON file.
    /// Unset disables event logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            events_log: None,
        }
    }
}

pub(crate) fn default_retries() -> u32 {
    5
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::InvalidRequest(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| {
            LockError::InvalidRequest(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path wins; otherwise the `LINKLOCK_CONFIG` environment
    /// variable is consulted; otherwise the built-in defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.retries, 5);
        assert!(config.events_log.is_none());
    }

    #[test]
    fn load_parses_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linklock.yaml");
        std::fs::write(&path, "retries: 9\nevents_log: /var/log/locks.ndjson\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retries, 9);
        assert_eq!(
            config.events_log,
            Some(PathBuf::from("/var/log/locks.ndjson"))
        );
    }

    #[test]
    fn load_applies_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linklock.yaml");
        std::fs::write(&path, "retries: 2\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retries, 2);
        assert!(config.events_log.is_none());
    }

    #[test]
    fn load_accepts_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linklock.yaml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retries, default_retries());
    }

    #[test]
    fn load_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, LockError::InvalidRequest(_)));
    }

    #[test]
    fn load_fails_on_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linklock.yaml");
        std::fs::write(&path, "retries: [not a number\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, LockError::InvalidRequest(_)));
    }

    #[test]
    #[serial]
    fn resolve_prefers_explicit_path_over_env() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        let from_env = dir.path().join("env.yaml");
        std::fs::write(&explicit, "retries: 7\n").unwrap();
        std::fs::write(&from_env, "retries: 3\n").unwrap();

        unsafe { std::env::set_var(CONFIG_ENV, &from_env) };
        let config = Config::resolve(Some(&explicit)).unwrap();
        unsafe { std::env::remove_var(CONFIG_ENV) };

        assert_eq!(config.retries, 7);
    }

    #[test]
    #[serial]
    fn resolve_reads_env_var() {
        let dir = TempDir::new().unwrap();
        let from_env = dir.path().join("env.yaml");
        std::fs::write(&from_env, "retries: 3\n").unwrap();

        unsafe { std::env::set_var(CONFIG_ENV, &from_env) };
        let config = Config::resolve(None).unwrap();
        unsafe { std::env::remove_var(CONFIG_ENV) };

        assert_eq!(config.retries, 3);
    }

    #[test]
    #[serial]
    fn resolve_defaults_without_env() {
        unsafe { std::env::remove_var(CONFIG_ENV) };
        let config = Config::resolve(None).unwrap();
        assert_eq!(config.retries, default_retries());
    }
}
