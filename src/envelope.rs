//! The uniform response envelope.
//!
//! Every endpoint response arrives wrapped as
//! `{success, body, message?, errors?}`. The envelope is decoded and
//! validated before any endpoint-specific decoding of `body` happens, and a
//! `success: false` envelope is an API error even when the HTTP status was
//! 2xx.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// Maximum number of bytes of a raw payload carried in decode errors.
const SNIPPET_LIMIT: usize = 256;

/// One entry of an envelope's `errors` list: a human-readable message plus
/// whatever per-field detail the provider attached.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub detail: BTreeMap<String, serde_json::Value>,
}

/// The outer JSON wrapper common to every response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl Envelope {
    /// Parse raw response bytes into an envelope.
    ///
    /// A payload that does not fit the envelope shape fails with a decode
    /// error carrying a truncated copy of the payload for diagnostics.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(|e| {
            Error::with_source(
                ErrorKind::Decode {
                    message: format!("response is not a valid envelope: {}", e),
                    snippet: snippet(raw),
                },
                e,
            )
        })
    }

    /// Convert a `success: false` envelope into the structured API error.
    pub fn into_api_error(self) -> Error {
        let message = self
            .message
            .or_else(|| self.errors.first().map(|e| e.message.clone()))
            .unwrap_or_else(|| "request failed".to_string());
        Error::new(ErrorKind::Api {
            message,
            errors: self.errors,
        })
    }

    /// Decode `body` into the endpoint-specific type.
    pub fn decode_body<T: DeserializeOwned>(self) -> Result<T> {
        let snippet = snippet_of_value(&self.body);
        serde_json::from_value(self.body).map_err(|e| {
            Error::with_source(
                ErrorKind::Decode {
                    message: format!("body did not match the expected shape: {}", e),
                    snippet,
                },
                e,
            )
        })
    }

    /// Decode `body`, normalizing the provider's "no data" quirk.
    ///
    /// Several endpoints answer with `[]` (or a null/absent body) where an
    /// object is expected. Those shapes decode to `T::default()` here; any
    /// other body goes through the strict path.
    pub fn decode_body_or_default<T: DeserializeOwned + Default>(self) -> Result<T> {
        match &self.body {
            serde_json::Value::Null => Ok(T::default()),
            serde_json::Value::Array(items) if items.is_empty() => Ok(T::default()),
            _ => self.decode_body(),
        }
    }
}

/// Truncate a raw payload for inclusion in a decode error.
fn snippet(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    truncate_snippet(&text)
}

fn snippet_of_value(value: &serde_json::Value) -> String {
    truncate_snippet(&value.to_string())
}

fn truncate_snippet(text: &str) -> String {
    if text.len() <= SNIPPET_LIMIT {
        return text.to_string();
    }
    let mut end = SNIPPET_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Device {
        #[serde(rename = "PK", default)]
        pk: String,
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_parse_success_envelope() {
        let raw = br#"{"body": {"PK": "abc123", "name": "router"}, "success": true}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert!(envelope.success);
        assert!(envelope.message.is_none());
        assert!(envelope.errors.is_empty());

        let device: Device = envelope.decode_body().unwrap();
        assert_eq!(device.pk, "abc123");
        assert_eq!(device.name, "router");
    }

    #[test]
    fn test_parse_failure_envelope_with_errors() {
        let raw = br#"{
            "success": false,
            "message": "validation failed",
            "errors": [{"message": "name is required", "field": "name"}]
        }"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert!(!envelope.success);

        let err = envelope.into_api_error();
        match err.kind {
            ErrorKind::Api { message, errors } => {
                assert_eq!(message, "validation failed");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "name is required");
                assert_eq!(errors[0].detail.get("field"), Some(&json!("name")));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_first_error_message() {
        let raw = br#"{"success": false, "errors": [{"message": "bad profile id"}]}"#;
        let err = Envelope::parse(raw).unwrap().into_api_error();
        assert!(err.to_string().contains("bad profile id"));
    }

    #[test]
    fn test_parse_non_envelope_payload_carries_snippet() {
        let raw = br#"<html>502 Bad Gateway</html>"#;
        let err = Envelope::parse(raw).unwrap_err();
        match err.kind {
            ErrorKind::Decode { snippet, .. } => {
                assert!(snippet.contains("502 Bad Gateway"));
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_success_field_is_decode_error() {
        let raw = br#"{"body": {}}"#;
        let err = Envelope::parse(raw).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode { .. }));
    }

    #[test]
    fn test_long_payload_snippet_is_truncated() {
        let raw = format!("{{\"garbage\": \"{}\"", "x".repeat(1000));
        let err = Envelope::parse(raw.as_bytes()).unwrap_err();
        match err.kind {
            ErrorKind::Decode { snippet, .. } => {
                assert!(snippet.ends_with("...[truncated]"));
                assert!(snippet.len() <= SNIPPET_LIMIT + "...[truncated]".len());
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_body_mismatch_is_decode_error() {
        let raw = br#"{"body": {"PK": 42}, "success": true}"#;
        let envelope = Envelope::parse(raw).unwrap();
        let err = envelope.decode_body::<Device>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode { .. }));
    }

    #[test]
    fn test_empty_array_body_normalizes_to_default() {
        // Some default-rule and deletion endpoints answer [] for "no data".
        let raw = br#"{"body": [], "success": true}"#;
        let device: Device = Envelope::parse(raw).unwrap().decode_body_or_default().unwrap();
        assert_eq!(device, Device::default());
    }

    #[test]
    fn test_absent_body_normalizes_to_default() {
        let raw = br#"{"success": true}"#;
        let device: Device = Envelope::parse(raw).unwrap().decode_body_or_default().unwrap();
        assert_eq!(device, Device::default());
    }

    #[test]
    fn test_or_default_still_decodes_real_bodies() {
        let raw = br#"{"body": {"PK": "p1", "name": "laptop"}, "success": true}"#;
        let device: Device = Envelope::parse(raw).unwrap().decode_body_or_default().unwrap();
        assert_eq!(device.pk, "p1");
    }

    #[test]
    fn test_or_default_rejects_non_empty_wrong_shapes() {
        let raw = br#"{"body": [1, 2, 3], "success": true}"#;
        let err = Envelope::parse(raw)
            .unwrap()
            .decode_body_or_default::<Device>()
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode { .. }));
    }
}
