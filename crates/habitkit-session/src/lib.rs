//! Session state for habitkit clients.
//!
//! This crate answers one question for the request client: "may this
//! request carry a credential, and which one?"
//!
//! 1. **State**: a three-state tag ([`SessionState`]): anonymous,
//!    waiting on a password-change challenge, or holding a credential
//! 2. **Store**: the lock-guarded owner of that state ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← reads the credential before a request, writes after
//!     ↕
//! Session Layer (this crate)  ← single source of truth for auth status
//! ```

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{Credential, PendingChallenge, SessionState};
pub use store::{SessionSnapshot, SessionStore};
