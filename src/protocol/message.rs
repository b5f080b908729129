//! Envelope types for the shell <-> UI bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;

/// Failure shape carried inside a `response` envelope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireError {
    /// Stable failure class, see [`CommandError::code`].
    pub code: String,
    pub message: String,
}

impl From<&CommandError> for WireError {
    fn from(err: &CommandError) -> Self {
        WireError {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// A single wire message, discriminated by its `type` field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Envelope {
    /// UI process invokes a named channel. `id` is the per-call correlation
    /// token; the shell answers with exactly one `response` carrying it.
    #[serde(rename = "request")]
    Request {
        id: String,
        channel: String,
        #[serde(default)]
        payload: Value,
    },

    /// Shell resolves or rejects one request.
    #[serde(rename = "response")]
    Response {
        id: String,
        ok: bool,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<WireError>,
    },

    /// One-way notification from the shell; the UI never replies.
    #[serde(rename = "push")]
    Push {
        channel: String,
        #[serde(default)]
        payload: Value,
    },
}

impl Envelope {
    /// Build a request with a fresh correlation token.
    pub fn request(channel: &str, payload: Value) -> Self {
        Envelope::Request {
            id: new_call_id(),
            channel: channel.to_string(),
            payload,
        }
    }

    pub fn ok(id: String, value: Value) -> Self {
        Envelope::Response {
            id,
            ok: true,
            value,
            error: None,
        }
    }

    pub fn err(id: String, error: &CommandError) -> Self {
        Envelope::Response {
            id,
            ok: false,
            value: Value::Null,
            error: Some(WireError::from(error)),
        }
    }

    pub fn push(channel: &str, payload: Value) -> Self {
        Envelope::Push {
            channel: channel.to_string(),
            payload,
        }
    }
}

/// Fresh correlation token for one request/response pair.
pub fn new_call_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_round_trips() {
        let env = Envelope::Request {
            id: "42".into(),
            channel: "command-exists".into(),
            payload: json!("ls"),
        };
        let wire = serde_json::to_string(&env).unwrap();
        assert!(wire.contains(r#""type":"request""#));
        let back: Envelope = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn success_response_omits_error_field() {
        let wire = serde_json::to_string(&Envelope::ok("1".into(), json!(true))).unwrap();
        assert!(!wire.contains("error"));
        assert!(wire.contains(r#""ok":true"#));
    }

    #[test]
    fn failure_response_carries_code_and_message() {
        let err = CommandError::NoSuchChannel {
            channel: "nope".into(),
        };
        let wire = serde_json::to_string(&Envelope::err("1".into(), &err)).unwrap();
        let back: Envelope = serde_json::from_str(&wire).unwrap();
        match back {
            Envelope::Response {
                ok, error: Some(e), ..
            } => {
                assert!(!ok);
                assert_eq!(e.code, "ROUTING");
                assert!(e.message.contains("nope"));
            }
            other => panic!("expected failure response, got {:?}", other),
        }
    }

    #[test]
    fn request_payload_defaults_to_null() {
        let back: Envelope =
            serde_json::from_str(r#"{"type":"request","id":"7","channel":"import-config"}"#)
                .unwrap();
        match back {
            Envelope::Request { payload, .. } => assert!(payload.is_null()),
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn call_ids_are_unique() {
        assert_ne!(new_call_id(), new_call_id());
    }
}
