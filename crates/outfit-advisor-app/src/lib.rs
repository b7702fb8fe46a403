#![warn(missing_docs)]
//! # outfit-advisor-app
//!
//! ## Purpose
//! Orchestrates session state, the API client, identity and the view-model
//! for `outfit-advisor`.
//!
//! ## Responsibilities
//! - Drive the upload workflow (gate -> analyze -> initial advice ->
//!   feedback) and the chat loop.
//! - Reject overlapping requests and discard stale responses.
//! - Load configuration and initialize structured logging.
//! - Parse and render the line-driven CLI.
//!
//! ## Data flow
//! CLI command -> [`AdvisorApp`] handler -> [`PendingCall`] ->
//! `ApiClient::dispatch` -> [`AdvisorApp::complete`] -> `AdvisorView`.
//!
//! ## Ownership and lifetimes
//! [`AdvisorApp`] owns its session, view and store; handlers take
//! `&mut self`, so the single owner thread needs no locking.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Network and contract
//! failures inside a workflow are turned into notices or transcript entries
//! instead of being returned.
//!
//! ## Security and privacy notes
//! - Tokens never reach log events; [`redact_sensitive`] scrubs free text.
//! - Uploads past the first one require a server-issued identity.

mod command;
mod config;
mod guard;
mod logging;
mod render;
mod workflow;

use std::time::{SystemTime, UNIX_EPOCH};

use outfit_advisor_api::ApiError;
use outfit_advisor_auth::{AuthError, StoreError};
use outfit_advisor_core::CoreError;
use outfit_advisor_ui::UiError;
use thiserror::Error;

pub use command::{Command, CommandError, HELP_TEXT, parse_command};
pub use config::{
    AppConfig, DEFAULT_BASE_URL, DEFAULT_LOG_FILTER, ENV_BASE_URL, ENV_LOG, ENV_STORAGE,
    ENV_TIMEOUT_SECS,
};
pub use guard::{Admission, CallKind, Lane, RequestGuard, RequestTicket};
pub use logging::init_tracing;
pub use render::render_view;
pub use workflow::{
    ADVICE_ERROR_PREFIX, ANALYSIS_ERROR_PREFIX, AdvisorApp, BUSY_NOTICE, CHAT_ERROR_PREFIX,
    MISSING_ADVICE_TEXT, PendingCall, SESSION_LAPSED_NOTICE, UPLOAD_UNLOCKED_NOTICE,
};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("OUTFIT_ADVISOR_VERSION");

const REDACTED: &str = "<redacted>";
const SENSITIVE_KEYS: [&str; 5] = ["bearer", "authorization", "password", "access_token", "token"];

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Redacts values that follow common secret markers.
///
/// `access_token=abc; path=/` becomes `access_token=<redacted>; path=/`.
/// Text without a separator after the marker is left unchanged.
pub fn redact_sensitive(input: &str) -> String {
    SENSITIVE_KEYS
        .iter()
        .fold(input.to_string(), |text, key| redact_values_after(&text, key))
}

fn redact_values_after(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(offset) = lower[cursor..].find(key) {
        let key_end = cursor + offset + key.len();
        output.push_str(&input[cursor..key_end]);

        let rest = &input[key_end..];
        let separator_len = rest.len()
            - rest
                .trim_start_matches(|c: char| matches!(c, '=' | ':' | ' ' | '"'))
                .len();
        if separator_len == 0 {
            cursor = key_end;
            continue;
        }
        output.push_str(&rest[..separator_len]);

        let value_start = key_end + separator_len;
        let value_len = input[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, ';' | ',' | '&' | '"'))
            .unwrap_or(input.len() - value_start);
        if value_len > 0 {
            output.push_str(REDACTED);
        }
        cursor = value_start + value_len;
    }

    output.push_str(&input[cursor..]);
    output
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// API client error outside a workflow step.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    /// Identity error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Client storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    /// View-model error.
    #[error("ui error: {0}")]
    Ui(#[from] UiError),
    /// Session model error.
    #[error("session error: {0}")]
    Core(#[from] CoreError),
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),
    /// Terminal I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// "Next" pressed without a picked image.
    #[error("select an image first")]
    NoImageSelected,
    /// Chat used before any analysis completed.
    #[error("upload a photo before asking for advice")]
    NoAnalysis,
}
