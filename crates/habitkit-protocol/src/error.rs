//! Error types for the protocol layer.
//!
//! Each crate in habitkit defines its own error enum. A `ProtocolError`
//! always means the problem is in shaping or reading a message, never in
//! the network or the session.

/// Errors that can occur while building requests or reading responses.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// each `#[error("...")]` is the text you see in logs.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a payload to JSON failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A JSON value did not match the expected shape.
    ///
    /// Common causes: missing required fields or wrong value types in a
    /// habit record returned by the server.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value is well-formed but breaks a protocol rule, e.g. an empty
    /// habit id or an unknown frequency name.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// The non-success outcomes of an exchange, as an error value.
///
/// Produced by [`ResponseOutcome::into_result`](crate::ResponseOutcome::into_result)
/// for callers that prefer `?` over matching on the outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutcomeError {
    /// No session, or the server rejected the credential.
    #[error("authentication error: {0}")]
    Auth(String),

    /// A password change is required before a credential is issued.
    /// Carries the provider's challenge session token.
    #[error("password change required")]
    ChallengeRequired(String),

    /// The request never got an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-auth error status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}
