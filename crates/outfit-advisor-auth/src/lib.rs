#![warn(missing_docs)]
//! # outfit-advisor-auth
//!
//! ## Purpose
//! Implements identity, client storage and the upload session gate for
//! `outfit-advisor`.
//!
//! ## Responsibilities
//! - Obtain server-issued identity tokens through an injectable transport.
//! - Persist the identity into client storage (local keys plus a mirrored
//!   `access_token` cookie) and clear it on logout.
//! - Decide whether an upload may proceed or must wait for a login.
//! - Track the signed-in identity and its lapse with [`IdentityMachine`].
//!
//! ## Data flow
//! User enters an email -> [`AuthClient::login`] -> [`AuthTransport`] ->
//! [`SessionToken`] -> [`persist_identity`] -> [`evaluate_upload_gate`] reads
//! the cookie on the next upload.
//!
//! ## Ownership and lifetimes
//! Tokens and stored values are owned strings so they can move between the
//! store, the state machine and outgoing requests without lifetime coupling.
//!
//! ## Error model
//! Invalid input, transport failures and malformed login responses surface
//! as [`AuthError`]. Storage failures surface separately as [`StoreError`]
//! from the store and gate functions.
//!
//! ## Security and privacy notes
//! The client never fabricates tokens; only values returned by the login
//! endpoint are stored. Token values are not logged.
//!
//! ## Example
//! ```rust
//! use outfit_advisor_auth::{Identity, IdentityMachine};
//!
//! let machine = IdentityMachine::anonymous();
//! assert_eq!(machine.identity(), &Identity::Anonymous);
//! ```

mod gate;
mod identity;
mod store;

use std::sync::Arc;

use outfit_advisor_api::{
    ApiError, HttpRequest, HttpTransport, RequestBody, join_endpoint, json_body,
    validate_base_url,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use gate::{
    GateDecision, clear_identity, current_identity, evaluate_upload_gate, has_uploaded_before,
    persist_identity,
};
pub use identity::{Identity, IdentityMachine};
pub use store::{
    ClientStorageSnapshot, ClientStore, FileClientStore, MemoryClientStore, StoreError,
    StoredCookie, live_cookie,
};

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/auth/login";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/auth/logout";
/// Local-storage key holding the signed-in email.
pub const STORAGE_KEY_USER_EMAIL: &str = "user_email";
/// Local-storage key holding the identity token.
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "access_token";
/// Local-storage key flagging that an upload already happened.
pub const STORAGE_KEY_HAS_UPLOADED: &str = "has_uploaded";
/// Cookie mirroring the identity token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Path attribute of the identity cookie.
pub const COOKIE_PATH: &str = "/";
/// Identity lifetime used when the server sends no `expires_in` (7 days).
pub const TOKEN_LIFETIME_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Login request payload forwarded to the auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
}

/// Login response payload returned by the auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Server-issued identity token.
    pub access_token: String,
    /// Token type, `bearer` for the reference server.
    pub token_type: String,
    /// Lifetime in seconds, when the server reports one.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Identity token with absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Token sent as the `access_token` cookie.
    pub access_token: String,
    /// Signed-in email.
    pub email: String,
    /// Absolute epoch milliseconds when the token expires.
    pub expires_at_ms: u64,
}

impl SessionToken {
    /// Returns `true` when the token has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Abstract transport used by the auth client.
pub trait AuthTransport: Send + Sync {
    /// Sends a login request to the auth backend.
    fn authenticate(&self, endpoint: &Url, request: &LoginRequest)
    -> Result<LoginResponse, AuthError>;

    /// Tells the auth backend the session ended.
    fn end_session(&self, endpoint: &Url, access_token: &str) -> Result<(), AuthError>;
}

/// [`AuthTransport`] over the shared [`HttpTransport`].
#[derive(Clone)]
pub struct HttpAuthTransport {
    http: Arc<dyn HttpTransport>,
}

impl HttpAuthTransport {
    /// Wraps an HTTP transport.
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }
}

impl AuthTransport for HttpAuthTransport {
    fn authenticate(
        &self,
        endpoint: &Url,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        let response = self
            .http
            .execute(&HttpRequest {
                url: endpoint.clone(),
                body: RequestBody::UrlEncoded(vec![("email".to_string(), request.email.clone())]),
                access_token: None,
            })
            .map_err(AuthError::Transport)?;
        let body = json_body(&response).map_err(AuthError::Transport)?;
        serde_json::from_str(body)
            .map_err(|error| AuthError::InvalidResponse(format!("login decode failure: {error}")))
    }

    fn end_session(&self, endpoint: &Url, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .execute(&HttpRequest {
                url: endpoint.clone(),
                body: RequestBody::Empty,
                access_token: Some(access_token.to_string()),
            })
            .map_err(AuthError::Transport)?;
        if !response.is_success() {
            return Err(AuthError::Transport(ApiError::Status {
                status: response.status,
                reason: response.reason,
            }));
        }
        Ok(())
    }
}

/// Auth client that validates endpoint policy and executes login flow.
#[derive(Clone)]
pub struct AuthClient {
    login_url: Url,
    logout_url: Url,
    transport: Arc<dyn AuthTransport>,
}

impl AuthClient {
    /// Creates a validated auth client for a service base URL.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEndpoint`] when the base URL violates the
    /// transport policy.
    pub fn new(base_url: &str, transport: Arc<dyn AuthTransport>) -> Result<Self, AuthError> {
        let base = validate_base_url(base_url).map_err(AuthError::InvalidEndpoint)?;
        let login_url = join_endpoint(&base, LOGIN_PATH).map_err(AuthError::InvalidEndpoint)?;
        let logout_url = join_endpoint(&base, LOGOUT_PATH).map_err(AuthError::InvalidEndpoint)?;
        Ok(Self {
            login_url,
            logout_url,
            transport,
        })
    }

    /// Executes login and converts the server response into a session token.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEmail`] for malformed addresses.
    /// Returns [`AuthError::InvalidResponse`] when no token is issued.
    /// Propagates transport errors as-is.
    pub fn login(&self, email: &str, now_ms: u64) -> Result<SessionToken, AuthError> {
        let email = email.trim();
        if !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let response = self.transport.authenticate(
            &self.login_url,
            &LoginRequest {
                email: email.to_string(),
            },
        )?;

        if response.access_token.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "response missing access token".to_string(),
            ));
        }

        tracing::debug!(endpoint = %self.login_url, token_type = %response.token_type, "login accepted");
        let lifetime_ms = response
            .expires_in
            .map(|seconds| seconds.saturating_mul(1000))
            .unwrap_or(TOKEN_LIFETIME_MS);

        Ok(SessionToken {
            access_token: response.access_token,
            email: email.to_string(),
            expires_at_ms: now_ms.saturating_add(lifetime_ms),
        })
    }

    /// Notifies the backend that `token` is no longer used.
    ///
    /// # Errors
    /// Propagates transport errors; callers clear local state regardless.
    pub fn logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        tracing::debug!(endpoint = %self.logout_url, "ending server session");
        self.transport
            .end_session(&self.logout_url, &token.access_token)
    }

    /// Returns the login endpoint.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

/// Returns `true` for `local@domain.tld` shaped addresses without whitespace.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Errors produced by auth client/state logic.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Endpoint violates security or contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(ApiError),
    /// Email is not a valid address.
    #[error("Please enter a valid email address")]
    InvalidEmail,
    /// Transport failure from auth backend.
    #[error("auth transport failure: {0}")]
    Transport(ApiError),
    /// Response payload violated auth contract expectations.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
}
