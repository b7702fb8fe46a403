//! Signed-in identity tracked by the client between requests.
//!
//! The identity mirrors the `access_token` cookie: it is restored from a live
//! cookie at startup, replaced on login, and lapses when the cookie lifetime
//! runs out. A lapsed identity remembers its email so the login prompt can
//! say whose session ended.

use crate::SessionToken;
use crate::gate::current_identity;
use crate::store::ClientStore;

/// Where the client stands with respect to the server-issued identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No identity was ever issued, or the user logged out.
    Anonymous,
    /// A token is held and its cookie has not lapsed yet.
    SignedIn(SessionToken),
    /// The cookie lifetime ran out; uploads past the first need a new login.
    Lapsed {
        /// Email of the session that lapsed.
        email: String,
    },
}

/// Identity holder driving the header, the gate and outgoing cookies.
#[derive(Debug, Clone)]
pub struct IdentityMachine {
    identity: Identity,
}

impl IdentityMachine {
    /// Starts anonymous.
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
        }
    }

    /// Restores the identity mirrored in `store` when its cookie is live.
    pub fn restore(store: &dyn ClientStore, now_ms: u64) -> Self {
        match current_identity(store, now_ms) {
            Some(token) => Self {
                identity: Identity::SignedIn(token),
            },
            None => Self::anonymous(),
        }
    }

    /// Returns the current identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Adopts a freshly issued token, replacing any earlier identity.
    pub fn sign_in(&mut self, token: SessionToken) {
        self.identity = Identity::SignedIn(token);
    }

    /// Lapses the identity once its cookie lifetime is over.
    ///
    /// Returns `true` only on the call that performed the transition.
    pub fn refresh(&mut self, now_ms: u64) -> bool {
        let Identity::SignedIn(token) = &self.identity else {
            return false;
        };
        if !token.is_expired(now_ms) {
            return false;
        }
        self.identity = Identity::Lapsed {
            email: token.email.clone(),
        };
        true
    }

    /// Drops the identity and returns the token still worth revoking
    /// server-side, if it had not lapsed.
    pub fn sign_out(&mut self, now_ms: u64) -> Option<SessionToken> {
        match std::mem::replace(&mut self.identity, Identity::Anonymous) {
            Identity::SignedIn(token) if !token.is_expired(now_ms) => Some(token),
            _ => None,
        }
    }

    /// Returns the token to send as the `access_token` cookie at `now_ms`.
    pub fn active(&self, now_ms: u64) -> Option<&SessionToken> {
        match &self.identity {
            Identity::SignedIn(token) if !token.is_expired(now_ms) => Some(token),
            _ => None,
        }
    }
}

impl Default for IdentityMachine {
    fn default() -> Self {
        Self::anonymous()
    }
}
