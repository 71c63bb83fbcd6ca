//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, log settings and page size from defaults
//!   overlaid by `TRIVIA_*` environment variables.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - `page_size` is always at least 1.

use crate::logging::default_log_level;
use crate::selector::question_selector::DEFAULT_PAGE_SIZE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TRIVIA_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TRIVIA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRIVIA_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "TRIVIA_PAGE_SIZE";

const DEFAULT_DB_FILE_NAME: &str = "trivia.sqlite3";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
    pub page_size: usize,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TriviaConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, overlaying defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_PAGE_SIZE) {
            config.page_size = parse_page_size(&raw)?;
        }
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPageSize(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageSize(value) => write!(
                f,
                "{ENV_PAGE_SIZE} must be a positive integer, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Parses a positive page size.
pub fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidPageSize(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TriviaConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_PAGE_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = TriviaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TriviaConfig::default());
        assert_eq!(config.page_size, 10);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults_and_blank_is_ignored() {
        let config = TriviaConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/quiz.db"),
            (ENV_LOG_DIR, "   "),
            (ENV_PAGE_SIZE, "5"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/quiz.db"));
        assert!(config.log_dir.is_none());
        assert_eq!(config.page_size, 5);
    }

    #[test]
    fn invalid_page_size_is_rejected() {
        for raw in ["0", "-3", "ten"] {
            let err = TriviaConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, raw)])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidPageSize(raw.to_string()));
        }
    }
}
