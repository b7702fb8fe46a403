//! Layered configuration: TOML file, then environment, then CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::AppError;

/// Environment variable overriding the backend base URL.
pub const ENV_BASE_URL: &str = "OUTFIT_ADVISOR_BASE_URL";
/// Environment variable overriding the client storage file.
pub const ENV_STORAGE: &str = "OUTFIT_ADVISOR_STORAGE";
/// Environment variable overriding the log filter.
pub const ENV_LOG: &str = "OUTFIT_ADVISOR_LOG";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "OUTFIT_ADVISOR_TIMEOUT_SECS";

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Log filter used when nothing else is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Backend origin.
    pub base_url: String,
    /// Client storage file. `None` keeps storage in memory.
    pub storage_path: Option<PathBuf>,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    /// Per-request timeout. `None` uses the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        toml::from_str(raw).map_err(|err| AppError::Config(err.to_string()))
    }

    /// Loads `path` (when given) and applies process environment overrides.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the file cannot be read or parsed,
    /// or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    AppError::Config(format!("failed to read {}: {err}", path.display()))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::apply_env_from`].
    pub fn apply_env(&mut self) -> Result<(), AppError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the timeout is not a positive integer.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(base_url) = value(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(storage) = value(ENV_STORAGE) {
            self.storage_path = Some(PathBuf::from(storage));
        }
        if let Some(filter) = value(ENV_LOG) {
            self.log_filter = filter;
        }
        if let Some(raw) = value(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("{ENV_TIMEOUT_SECS} must be a positive integer, got {raw}"))
                })?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Returns the request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
