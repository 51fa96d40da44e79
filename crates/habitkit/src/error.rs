//! Unified error type for habitkit.

use habitkit_protocol::{OutcomeError, ProtocolError};
use habitkit_session::SessionError;
use habitkit_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Request execution itself never fails with this type: `execute` always
/// returns a [`ResponseOutcome`](habitkit_protocol::ResponseOutcome).
/// `HabitkitError` shows up when building a client, when encoding or
/// decoding typed habit records, and when a caller turns an outcome into
/// a `Result` with `?`.
#[derive(Debug, thiserror::Error)]
pub enum HabitkitError {
    /// A transport could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A payload or record did not have the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local session precondition failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A request ended in a non-success outcome.
    #[error(transparent)]
    Outcome(#[from] OutcomeError),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
