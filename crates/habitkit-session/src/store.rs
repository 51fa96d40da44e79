//! The session store: the single owner of a client's [`SessionState`].
//!
//! # Concurrency note
//!
//! A client may have several requests in flight at once, and each of them
//! can end by installing or clearing the credential. Every read and every
//! read-modify-write happens under one `parking_lot::Mutex`.
//!
//! Serializing writes is not enough on its own: a request reads the session
//! when it goes out and writes it when the reply lands, possibly seconds
//! later. Every change bumps a generation counter. A request captures a
//! [`SessionSnapshot`] before sending, and its late write goes through
//! [`set_active_if`](SessionStore::set_active_if),
//! [`set_pending_if`](SessionStore::set_pending_if) or
//! [`revoke_if`](SessionStore::revoke_if). Those are dropped if the
//! session moved on in the meantime.
//!
//! The lock is never held across an `.await`; callers get snapshots.

use parking_lot::Mutex;

use crate::{Credential, PendingChallenge, SessionError, SessionState};

/// What a request saw of the session when it went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The credential to send, if any.
    pub credential: Option<Credential>,
    /// Generation of the state the credential was read from.
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    state: SessionState,
    generation: u64,
}

/// Lock-guarded holder of the current [`SessionState`].
///
/// ## Lifecycle
///
/// ```text
/// set_pending() ──→ [PendingChallenge] ──set_active()──→ [Active]
///                                                         │
/// set_active() ────────────────────────────────────────→ [Active]
///                                                         │
///                                  clear() / revoke_if()  ▼
///                                                    [Anonymous]
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: Mutex<Slot>,
}

impl SessionStore {
    /// Creates an anonymous session at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an active credential, replacing whatever was there
    /// (including a pending challenge).
    ///
    /// Surrounding whitespace is trimmed before storing.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidCredential`] if the credential is
    /// empty after trimming. The state is left unchanged.
    pub fn set_active(&self, credential: &str) -> Result<(), SessionError> {
        let token = valid_credential(credential)?;
        self.apply(|_| Some(SessionState::Active(Credential::new(token))));
        Ok(())
    }

    /// Like [`set_active`](Self::set_active), but only if the session is
    /// still at `generation`. Returns `Ok(false)` and leaves the state
    /// alone if anything changed it since.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidCredential`] if the credential is
    /// empty after trimming.
    pub fn set_active_if(
        &self,
        generation: u64,
        credential: &str,
    ) -> Result<bool, SessionError> {
        let token = valid_credential(credential)?;
        let installed = self.apply(|slot| {
            (slot.generation == generation)
                .then(|| SessionState::Active(Credential::new(token)))
        });
        if !installed {
            tracing::debug!(generation, "stale credential discarded");
        }
        Ok(installed)
    }

    /// Records a password-change challenge for `username`.
    ///
    /// This does NOT authorize requests: [`is_authenticated`](Self::is_authenticated)
    /// stays `false` until the challenge is answered and
    /// [`set_active`](Self::set_active) is called. Any active credential
    /// is dropped, since the session now belongs to a sign-in in progress.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidCredential`] if the challenge token
    /// is empty.
    pub fn set_pending(
        &self,
        challenge_token: &str,
        username: &str,
    ) -> Result<(), SessionError> {
        let challenge = valid_challenge(challenge_token, username)?;
        self.apply(|_| Some(SessionState::PendingChallenge(challenge)));
        Ok(())
    }

    /// Like [`set_pending`](Self::set_pending), but only if the session is
    /// still at `generation`.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidCredential`] if the challenge token
    /// is empty.
    pub fn set_pending_if(
        &self,
        generation: u64,
        challenge_token: &str,
        username: &str,
    ) -> Result<bool, SessionError> {
        let challenge = valid_challenge(challenge_token, username)?;
        let recorded = self.apply(|slot| {
            (slot.generation == generation)
                .then(|| SessionState::PendingChallenge(challenge))
        });
        if !recorded {
            tracing::debug!(generation, username, "stale challenge discarded");
        }
        Ok(recorded)
    }

    /// Forgets the credential and any pending challenge.
    ///
    /// Idempotent in state: clearing an anonymous session leaves it
    /// anonymous. The generation still moves, so replies to requests sent
    /// before the clear are discarded.
    pub fn clear(&self) {
        self.apply(|_| Some(SessionState::Anonymous));
    }

    /// Drops the active credential after the server rejected `rejected`.
    ///
    /// Nothing happens unless `rejected` is still the active credential:
    /// a rejection of an older token must not sign out a newer one, and a
    /// pending challenge has no credential to invalidate. Returns `true`
    /// if a credential was removed.
    pub fn revoke_if(&self, rejected: &Credential) -> bool {
        self.apply(|slot| match &slot.state {
            SessionState::Active(current) if current == rejected => {
                Some(SessionState::Anonymous)
            }
            _ => None,
        })
    }

    /// `true` iff an active credential is held. A pending challenge
    /// does not count.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.slot.lock().state, SessionState::Active(_))
    }

    /// `true` iff a password-change challenge is waiting for an answer.
    pub fn needs_challenge_response(&self) -> bool {
        matches!(self.slot.lock().state, SessionState::PendingChallenge(_))
    }

    /// A copy of the active credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        match &self.slot.lock().state {
            SessionState::Active(cred) => Some(cred.clone()),
            _ => None,
        }
    }

    /// The credential and generation, read under one lock.
    pub fn snapshot(&self) -> SessionSnapshot {
        let slot = self.slot.lock();
        SessionSnapshot {
            credential: match &slot.state {
                SessionState::Active(cred) => Some(cred.clone()),
                _ => None,
            },
            generation: slot.generation,
        }
    }

    /// Number of changes applied so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// A copy of the pending challenge, if any.
    pub fn pending_challenge(&self) -> Option<PendingChallenge> {
        match &self.slot.lock().state {
            SessionState::PendingChallenge(pending) => Some(pending.clone()),
            _ => None,
        }
    }

    /// A snapshot of the whole state.
    pub fn state(&self) -> SessionState {
        self.slot.lock().state.clone()
    }

    /// Applies a change under the lock and logs it.
    ///
    /// `next` sees the current slot and returns the new state, or `None`
    /// to leave it alone. Every applied change bumps the generation.
    fn apply(&self, next: impl FnOnce(&Slot) -> Option<SessionState>) -> bool {
        let mut slot = self.slot.lock();
        let Some(state) = next(&slot) else {
            return false;
        };
        let from = slot.state.name();
        slot.state = state;
        slot.generation = slot.generation.wrapping_add(1);
        let to = slot.state.name();
        let generation = slot.generation;
        drop(slot);

        if from != to {
            tracing::info!(from, to, generation, "session state changed");
        } else {
            tracing::debug!(state = to, generation, "session state refreshed");
        }
        true
    }
}

fn valid_credential(credential: &str) -> Result<String, SessionError> {
    let token = credential.trim();
    if token.is_empty() {
        tracing::warn!("refusing to install an empty credential");
        return Err(SessionError::InvalidCredential(
            "credential must not be empty",
        ));
    }
    Ok(token.to_string())
}

fn valid_challenge(
    challenge_token: &str,
    username: &str,
) -> Result<PendingChallenge, SessionError> {
    let token = challenge_token.trim();
    if token.is_empty() {
        tracing::warn!(username, "refusing to store an empty challenge");
        return Err(SessionError::InvalidCredential(
            "challenge token must not be empty",
        ));
    }
    Ok(PendingChallenge {
        session_token: token.to_string(),
        username: username.to_string(),
    })
}

// =========================================================================
// Tests
// =========================================================================
