//! Error types for the session layer.

/// Errors that can occur while changing session state.
///
/// Only local preconditions live here. A credential the server rejects is
/// not a `SessionError`: the request client reports that as an outcome
/// and clears the session itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The credential or challenge token was empty (or only whitespace).
    /// An empty bearer header would be sent as `Bearer ` and rejected, so
    /// it is refused up front.
    #[error("invalid credential: {0}")]
    InvalidCredential(&'static str),
}
