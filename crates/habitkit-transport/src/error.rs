/// Errors that can occur in the transport layer.
///
/// Every variant means the exchange never produced an HTTP status: the
/// request did not leave, or no response came back in time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The remote host could not be reached (refused, DNS, TLS handshake).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request was sent but failed mid-flight (reset, malformed reply).
    #[error("request failed: {0}")]
    Request(String),

    /// The target URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
