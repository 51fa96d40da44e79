//! Core request/response types.
//!
//! A [`RequestDescriptor`] is what a caller hands to the client; a
//! [`ResponseOutcome`] is what it gets back. Everything in between
//! (headers, URLs, status codes) stays inside the client.

use serde::{Deserialize, Serialize};

use crate::{Method, OutcomeError};

/// A JSON object with string keys: the shape of every request payload and
/// every successful response body.
pub type Payload = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// RequestDescriptor
// ---------------------------------------------------------------------------

/// One request as the caller describes it: verb, API-relative path and an
/// optional JSON payload.
///
/// The fields are private and there are no setters, so a descriptor cannot
/// change after it has been handed to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    payload: Option<Payload>,
}

impl RequestDescriptor {
    /// Creates a descriptor from its three parts.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        payload: Option<Payload>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            payload,
        }
    }

    /// A GET with no payload.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    /// A POST carrying `payload`.
    pub fn post(path: impl Into<String>, payload: Payload) -> Self {
        Self::new(Method::Post, path, Some(payload))
    }

    /// A PUT carrying `payload`.
    pub fn put(path: impl Into<String>, payload: Payload) -> Self {
        Self::new(Method::Put, path, Some(payload))
    }

    /// A DELETE, optionally with a body.
    pub fn delete(path: impl Into<String>, payload: Option<Payload>) -> Self {
        Self::new(Method::Delete, path, payload)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The path exactly as the caller wrote it.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path with leading and trailing `/` removed. `"/habits/"`,
    /// `"habits/"` and `"habits"` all name the same endpoint.
    pub fn normalized_path(&self) -> &str {
        self.path.trim_matches('/')
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }
}

// ---------------------------------------------------------------------------
// ResponseOutcome
// ---------------------------------------------------------------------------

/// The classified result of one request/response exchange.
///
/// Exactly one variant is produced per request:
///
/// ```text
///   Success           2xx, body as a JSON object
///   ChallengeRequired 2xx, but the provider wants a new password first
///   AuthError         no local session, or 401/403 from the server
///   TransportError    no HTTP response at all (connect failure, timeout)
///   ServerError       any other non-2xx status
/// ```
///
/// `#[serde(tag = "kind")]` gives the internally tagged form
/// `{ "kind": "AuthError", "message": "..." }`, which is handy for logging
/// or forwarding an outcome as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ResponseOutcome {
    Success { body: Payload },
    ChallengeRequired { session: String },
    AuthError { message: String },
    TransportError { message: String },
    ServerError { status: u16, message: String },
}

impl ResponseOutcome {
    pub fn success(body: Payload) -> Self {
        Self::Success { body }
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    /// Returns `true` only for [`ResponseOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success body, if this is a success.
    pub fn body(&self) -> Option<&Payload> {
        match self {
            Self::Success { body } => Some(body),
            _ => None,
        }
    }

    /// A human-readable message.
    ///
    /// Every non-success variant carries one. For a success it is the
    /// body's `message` field, when the server sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { body } => {
                body.get("message").and_then(|v| v.as_str())
            }
            Self::ChallengeRequired { .. } => {
                Some("a new password is required to complete sign-in")
            }
            Self::AuthError { message }
            | Self::TransportError { message }
            | Self::ServerError { message, .. } => Some(message),
        }
    }

    /// Short variant name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::ChallengeRequired { .. } => "challenge_required",
            Self::AuthError { .. } => "auth_error",
            Self::TransportError { .. } => "transport_error",
            Self::ServerError { .. } => "server_error",
        }
    }

    /// Converts the outcome into a `Result`, so callers can use `?`.
    ///
    /// # Errors
    /// Every variant other than `Success` becomes the matching
    /// [`OutcomeError`].
    pub fn into_result(self) -> Result<Payload, OutcomeError> {
        match self {
            Self::Success { body } => Ok(body),
            Self::ChallengeRequired { session } => {
                Err(OutcomeError::ChallengeRequired(session))
            }
            Self::AuthError { message } => Err(OutcomeError::Auth(message)),
            Self::TransportError { message } => {
                Err(OutcomeError::Transport(message))
            }
            Self::ServerError { status, message } => {
                Err(OutcomeError::Server { status, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    // =====================================================================
    // RequestDescriptor
    // =====================================================================

    #[test]
    fn test_normalized_path_trims_both_ends() {
        assert_eq!(RequestDescriptor::get("/habits/").normalized_path(), "habits");
        assert_eq!(RequestDescriptor::get("//login").normalized_path(), "login");
        assert_eq!(
            RequestDescriptor::get("habits/h1/history").normalized_path(),
            "habits/h1/history"
        );
    }

    #[test]
    fn test_path_keeps_caller_spelling() {
        let desc = RequestDescriptor::get("/habits/");
        assert_eq!(desc.path(), "/habits/");
    }

    #[test]
    fn test_constructors_set_method_and_payload() {
        let body = payload(json!({ "name": "read" }));

        let post = RequestDescriptor::post("habits", body.clone());
        assert_eq!(post.method(), Method::Post);
        assert_eq!(post.payload(), Some(&body));

        let put = RequestDescriptor::put("habits/h1", body.clone());
        assert_eq!(put.method(), Method::Put);

        let get = RequestDescriptor::get("habits");
        assert_eq!(get.method(), Method::Get);
        assert!(get.payload().is_none());

        let delete = RequestDescriptor::delete("habits/h1", None);
        assert_eq!(delete.method(), Method::Delete);
        assert!(delete.payload().is_none());
    }

    // =====================================================================
    // ResponseOutcome
    // =====================================================================

    #[test]
    fn test_outcome_serializes_internally_tagged() {
        let outcome = ResponseOutcome::ServerError {
            status: 500,
            message: "boom".into(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({ "kind": "ServerError", "status": 500, "message": "boom" })
        );
    }

    #[test]
    fn test_outcome_message_present_for_every_failure() {
        let failures = [
            ResponseOutcome::ChallengeRequired { session: "s1".into() },
            ResponseOutcome::auth_error("no active session"),
            ResponseOutcome::TransportError { message: "timed out".into() },
            ResponseOutcome::ServerError { status: 502, message: "bad gateway".into() },
        ];
        for outcome in failures {
            assert!(outcome.message().is_some(), "{outcome:?} has no message");
            assert!(!outcome.is_success());
        }
    }

    #[test]
    fn test_outcome_success_message_reads_body_field() {
        let with = ResponseOutcome::success(payload(json!({ "message": "ok" })));
        let without = ResponseOutcome::success(Payload::new());
        assert_eq!(with.message(), Some("ok"));
        assert_eq!(without.message(), None);
    }

    #[test]
    fn test_into_result_maps_each_variant() {
        let body = payload(json!({ "id": 1 }));
        assert_eq!(
            ResponseOutcome::success(body.clone()).into_result().unwrap(),
            body
        );
        assert_eq!(
            ResponseOutcome::auth_error("nope").into_result(),
            Err(OutcomeError::Auth("nope".into()))
        );
        assert_eq!(
            ResponseOutcome::ChallengeRequired { session: "s1".into() }.into_result(),
            Err(OutcomeError::ChallengeRequired("s1".into()))
        );
        assert_eq!(
            ResponseOutcome::ServerError { status: 404, message: "gone".into() }
                .into_result(),
            Err(OutcomeError::Server { status: 404, message: "gone".into() })
        );
    }
}
