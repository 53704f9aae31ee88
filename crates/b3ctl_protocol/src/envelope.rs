//! The `{ "status": ... }` response envelope.
//!
//! Every device route answers with a JSON object carrying a `status` field.
//! `"success"` marks a successful response whose remaining fields are the
//! payload; any other value is an application error message. A missing or
//! null status is a protocol violation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Status value marking a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// `status` was `"success"`; carries the decoded payload.
    Success(T),
    /// `status` was present but not `"success"`; carries it as a message.
    Failed(String),
    /// `status` was missing or null.
    NoStatus,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decodes an envelope from a response body.
    ///
    /// Fails if the body is not JSON or a success payload does not match `T`.
    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        match value.get("status") {
            None | Some(Value::Null) => Ok(Envelope::NoStatus),
            Some(Value::String(status)) if status == STATUS_SUCCESS => {
                Ok(Envelope::Success(serde_json::from_value(value)?))
            }
            Some(Value::String(status)) => Ok(Envelope::Failed(status.clone())),
            Some(other) => Ok(Envelope::Failed(other.to_string())),
        }
    }
}

/// Encodes a success response: the payload's fields plus `status`.
///
/// Payloads that do not serialize to a JSON object are placed under `data`.
pub fn encode_success<T: Serialize>(payload: &T) -> serde_json::Result<Vec<u8>> {
    let mut body = match serde_json::to_value(payload)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    };
    body.insert("status".into(), Value::String(STATUS_SUCCESS.into()));
    serde_json::to_vec(&Value::Object(body))
}

/// Encodes a status-only response, typically an error message.
pub fn encode_status(status: &str) -> Vec<u8> {
    let mut body = Map::new();
    body.insert("status".into(), Value::String(status.into()));
    Value::Object(body).to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Ack, ConfigSnapshot, TrackList};

    #[test]
    fn decode_success_payload() {
        let body = br#"{"status":"success","files":["a.mp3","b.mp3"]}"#;
        let envelope = Envelope::<TrackList>::decode(body).unwrap();
        assert_eq!(
            envelope,
            Envelope::Success(TrackList {
                files: vec!["a.mp3".into(), "b.mp3".into()]
            })
        );
    }

    #[test]
    fn decode_application_error() {
        let envelope = Envelope::<Ack>::decode(br#"{"status":"no config data"}"#).unwrap();
        assert_eq!(envelope, Envelope::Failed("no config data".into()));

        let envelope = Envelope::<Ack>::decode(br#"{"status":42}"#).unwrap();
        assert_eq!(envelope, Envelope::Failed("42".into()));
    }

    #[test]
    fn decode_missing_or_null_status() {
        assert_eq!(Envelope::<Ack>::decode(br#"{}"#).unwrap(), Envelope::NoStatus);
        assert_eq!(
            Envelope::<Ack>::decode(br#"{"status":null}"#).unwrap(),
            Envelope::NoStatus
        );
        assert_eq!(Envelope::<Ack>::decode(br#"[1,2]"#).unwrap(), Envelope::NoStatus);
    }

    #[test]
    fn decode_rejects_malformed_bodies() {
        assert!(Envelope::<Ack>::decode(b"<html>").is_err());
        // success, but the payload is missing a required field
        assert!(Envelope::<TrackList>::decode(br#"{"status":"success"}"#).is_err());
    }

    #[test]
    fn success_encoding_round_trips() {
        let snapshot = ConfigSnapshot::default().with_value("lpf_cutoff", 1000.0);
        let body = encode_success(&snapshot).unwrap();
        match Envelope::<ConfigSnapshot>::decode(&body).unwrap() {
            Envelope::Success(decoded) => assert_eq!(decoded.value("lpf_cutoff"), Some(1000.0)),
            other => panic!("unexpected envelope: {other:?}"),
        }

        let body = encode_success(&Ack {}).unwrap();
        assert_eq!(Envelope::<Ack>::decode(&body).unwrap(), Envelope::Success(Ack {}));
    }

    #[test]
    fn status_encoding() {
        let body = encode_status("Invalid action: rewind");
        assert_eq!(
            Envelope::<Ack>::decode(&body).unwrap(),
            Envelope::Failed("Invalid action: rewind".into())
        );
    }
}
