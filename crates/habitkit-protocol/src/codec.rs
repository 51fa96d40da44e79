//! JSON encoding of payloads and decoding of response bodies.
//!
//! The API speaks JSON in both directions, but servers and proxies in
//! front of it do not always: a gateway may answer with plain text or an
//! empty body. [`ResponseBody::parse`] accepts anything and tells the
//! client which case it got, so the client never fails on a body it
//! cannot read.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{Payload, ProtocolError};

/// Serializes a payload into request body bytes.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_payload(payload: &Payload) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(payload).map_err(ProtocolError::Encode)
}

/// Converts any serializable struct into a [`Payload`].
///
/// # Errors
/// - [`ProtocolError::Encode`] if serialization fails
/// - [`ProtocolError::InvalidMessage`] if the value is not a JSON object
pub fn to_payload<T: Serialize>(value: &T) -> Result<Payload, ProtocolError> {
    match serde_json::to_value(value).map_err(ProtocolError::Encode)? {
        Value::Object(map) => Ok(map),
        other => Err(ProtocolError::InvalidMessage(format!(
            "payload must be a JSON object, got {other}"
        ))),
    }
}

/// Decodes a typed value out of a JSON value.
///
/// # Errors
/// Returns [`ProtocolError::Decode`] if the value has the wrong shape.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(ProtocolError::Decode)
}

// ---------------------------------------------------------------------------
// ResponseBody
// ---------------------------------------------------------------------------

/// A response body, as far as the client can make sense of it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Valid JSON. A non-object value (e.g. a bare array from a list
    /// endpoint) is wrapped as `{"items": value}`.
    Json(Payload),

    /// Anything that is not JSON, including an empty body.
    Text(String),
}

impl ResponseBody {
    /// Parses raw body bytes. Never fails.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self::Json(map),
            Ok(other) => {
                let mut map = Payload::new();
                map.insert("items".to_string(), other);
                Self::Json(map)
            }
            Err(_) => {
                Self::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// The JSON object, if the body was JSON.
    pub fn as_json(&self) -> Option<&Payload> {
        match self {
            Self::Json(map) => Some(map),
            Self::Text(_) => None,
        }
    }

    /// The body's `message` string field, if any.
    pub fn message(&self) -> Option<&str> {
        self.as_json()
            .and_then(|map| map.get("message"))
            .and_then(Value::as_str)
    }

    /// Converts the body into a success payload. Text becomes
    /// `{"message": text}`.
    pub fn into_payload(self) -> Payload {
        match self {
            Self::Json(map) => map,
            Self::Text(text) => {
                let mut map = Payload::new();
                map.insert("message".to_string(), Value::String(text));
                map
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Identity-provider fields
// ---------------------------------------------------------------------------

/// The challenge name the identity provider uses for a forced password
/// change.
pub const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";

/// Returns the challenge session token if the body asks for a password
/// change.
///
/// Two shapes are recognised:
/// - the provider's own: `{"ChallengeName": "...", "Session": "..."}`
/// - the API's rewrap: `{"status": "NEW_PASSWORD_REQUIRED", "session": "..."}`
pub fn challenge_session(body: &Payload) -> Option<String> {
    let named = body
        .get("ChallengeName")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty())
        || body.get("status").and_then(Value::as_str)
            == Some(NEW_PASSWORD_REQUIRED);
    if !named {
        return None;
    }

    ["Session", "session"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Returns the bearer token carried by a login or password-change
/// response: top-level `token`, or `AuthenticationResult.IdToken`.
pub fn access_token(body: &Payload) -> Option<String> {
    let direct = body.get("token").and_then(Value::as_str);
    let nested = body
        .get("AuthenticationResult")
        .and_then(|r| r.get("IdToken"))
        .and_then(Value::as_str);

    direct
        .or(nested)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
