//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::AppError;

/// Installs a stderr `fmt` subscriber filtered by `filter`.
///
/// # Errors
/// Returns [`AppError::Logging`] for an invalid directive, or when a global
/// subscriber is already installed.
pub fn init_tracing(filter: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter).map_err(|err| AppError::Logging(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}
