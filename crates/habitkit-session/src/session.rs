//! Session types: what the client knows about who it is signed in as.
//!
//! A session is in exactly one of three states. It tracks:
//! - WHETHER requests may be authorized (an active bearer credential)
//! - WHAT the identity provider is waiting for (a pending password change)

use std::fmt;

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// An opaque bearer token issued by the identity provider.
///
/// The `Debug` impl never prints the token, so a session can be logged
/// with `{:?}` without leaking it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for building an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// PendingChallenge
// ---------------------------------------------------------------------------

/// A password-change challenge the provider issued at login.
///
/// The provider gives back a one-time session token instead of a
/// credential. It must be returned, together with the same username and
/// a new password, to finish signing in.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub session_token: String,
    pub username: String,
}

impl fmt::Debug for PendingChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingChallenge")
            .field("session_token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The authentication state of a client.
///
/// ```text
///                  login ok
///   Anonymous ─────────────────────────────→ Active
///       │                                     ↑  │
///       │ login → challenge    change-password│  │ logout / 401 / 403
///       ▼                               ok    │  ▼
///   PendingChallenge ─────────────────────────┘ Anonymous
/// ```
///
/// - **Anonymous**: no credential. Only bootstrap endpoints
///   (register, login, change-password) may be called.
/// - **PendingChallenge**: the provider wants a new password before it
///   issues a credential. Still not authorized. A 401/403 here changes
///   nothing, because there is no credential to invalidate.
/// - **Active**: a bearer credential is held and attached to every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    PendingChallenge(PendingChallenge),
    Active(Credential),
}

impl SessionState {
    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::PendingChallenge(_) => "pending_challenge",
            SessionState::Active(_) => "active",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
