//! HTTP transport abstraction layer for habitkit.
//!
//! Provides the [`HttpTransport`] trait that abstracts over how a single
//! request/response exchange reaches the network. The request client above
//! only ever talks to this trait, which keeps it testable with an in-memory
//! transport.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): HTTP(S) transport via `reqwest`

mod error;
#[cfg(feature = "reqwest")]
mod http;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::ReqwestTransport;

use std::fmt;

/// The HTTP verbs the habit API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns the uppercase wire name (`"GET"`, `"POST"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-built request, ready to be put on the wire.
///
/// The URL is absolute and the headers are final; the transport adds
/// nothing of its own beyond what the underlying client requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header value with the given name
    /// (case-insensitive), if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw result of an exchange: status code plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one transport is shared by every request a
///   client issues, possibly from several tasks at once.
/// - The returned future is `Send` so callers can `tokio::spawn` requests.
///
/// Implementations must not retry: one call is at most one exchange.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends the request and waits for the complete response.
    ///
    /// # Errors
    /// Returns a [`TransportError`] when no HTTP response was obtained.
    /// Any response with a status code, including 4xx/5xx, is `Ok`.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, TransportError>>
           + Send;
}
