//! Identity persistence and the upload session gate.

use crate::store::{ClientStore, StoreError, StoredCookie, live_cookie};
use crate::{
    ACCESS_TOKEN_COOKIE, COOKIE_PATH, STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_HAS_UPLOADED,
    STORAGE_KEY_USER_EMAIL, SessionToken, TOKEN_LIFETIME_MS,
};

const FLAG_TRUE: &str = "true";

/// Outcome of the upload gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Upload may be sent now.
    Proceed,
    /// Upload must wait for a login.
    Defer,
}

/// Returns `true` when the `has_uploaded` flag is set.
pub fn has_uploaded_before(store: &dyn ClientStore) -> bool {
    store.get_item(STORAGE_KEY_HAS_UPLOADED).as_deref() == Some(FLAG_TRUE)
}

/// Decides whether an upload may proceed.
///
/// Rule: without a live identity cookie, only the first-ever upload is
/// allowed. Proceeding always sets the `has_uploaded` flag.
///
/// # Errors
/// Returns [`StoreError`] when the flag cannot be written.
pub fn evaluate_upload_gate(
    store: &mut dyn ClientStore,
    now_ms: u64,
) -> Result<GateDecision, StoreError> {
    let identity_present = live_cookie(store, ACCESS_TOKEN_COOKIE, now_ms).is_some();
    if !identity_present && has_uploaded_before(store) {
        return Ok(GateDecision::Defer);
    }

    store.set_item(STORAGE_KEY_HAS_UPLOADED, FLAG_TRUE)?;
    Ok(GateDecision::Proceed)
}

/// Stores a server-issued identity and mirrors it into the cookie jar.
///
/// The cookie lives for at most seven days and never beyond token expiry.
///
/// # Errors
/// Returns [`StoreError`] when any write fails.
pub fn persist_identity(
    store: &mut dyn ClientStore,
    token: &SessionToken,
    now_ms: u64,
) -> Result<(), StoreError> {
    store.set_item(STORAGE_KEY_USER_EMAIL, &token.email)?;
    store.set_item(STORAGE_KEY_ACCESS_TOKEN, &token.access_token)?;
    store.set_cookie(
        ACCESS_TOKEN_COOKIE,
        StoredCookie {
            value: token.access_token.clone(),
            path: COOKIE_PATH.to_string(),
            expires_at_ms: now_ms
                .saturating_add(TOKEN_LIFETIME_MS)
                .min(token.expires_at_ms),
        },
    )
}

/// Removes the identity and expires the cookie.
///
/// # Errors
/// Returns [`StoreError`] when any write fails.
pub fn clear_identity(store: &mut dyn ClientStore) -> Result<(), StoreError> {
    store.remove_item(STORAGE_KEY_USER_EMAIL)?;
    store.remove_item(STORAGE_KEY_ACCESS_TOKEN)?;
    store.set_cookie(
        ACCESS_TOKEN_COOKIE,
        StoredCookie {
            value: String::new(),
            path: COOKIE_PATH.to_string(),
            expires_at_ms: 0,
        },
    )
}

/// Restores the identity from a live cookie.
pub fn current_identity(store: &dyn ClientStore, now_ms: u64) -> Option<SessionToken> {
    let cookie = store
        .cookie(ACCESS_TOKEN_COOKIE)
        .filter(|cookie| cookie.is_live(now_ms))?;

    Some(SessionToken {
        access_token: cookie.value,
        email: store.get_item(STORAGE_KEY_USER_EMAIL).unwrap_or_default(),
        expires_at_ms: cookie.expires_at_ms,
    })
}
