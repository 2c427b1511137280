//! Wire envelope exchanged over the sync relay
//!
//! Every frame on the relay connection is a UTF-8 JSON object with a
//! `type` tag from an open set. The relay only inspects frames enough to
//! validate them; it forwards the original text, so unknown tags and
//! extra fields pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Known envelope kinds. The set is open: kinds outside this list are
/// relayed opaquely and ignored by receivers that do not recognize them.
pub mod kind {
    /// Server greeting, sent once right after a connection is accepted
    pub const CONNECTED: &str = "CONNECTED";

    /// Product catalog changed; receivers should refetch products
    pub const PRODUCTS_UPDATED: &str = "PRODUCTS_UPDATED";

    /// Slider images changed; receivers should refetch sliders
    pub const SLIDERS_UPDATED: &str = "SLIDERS_UPDATED";

    /// Store settings changed; receivers should refetch settings
    pub const SETTINGS_UPDATED: &str = "SETTINGS_UPDATED";
}

/// The unit of exchange between sync clients
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Open string tag identifying what changed
    #[serde(rename = "type")]
    pub kind: String,

    /// Producer-assigned epoch milliseconds, for display/ordering
    /// heuristics on the receiving side only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Opaque identifier of the originating client session, unverified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Free-form kind-specific data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Create an envelope of the given kind, stamped with the current time
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
            source: None,
            payload: None,
        }
    }

    /// Create an envelope with the producer's session identifier attached
    pub fn with_source(kind: impl Into<String>, source: impl Into<String>) -> Self {
        let mut envelope = Self::new(kind);
        envelope.source = Some(source.into());
        envelope
    }

    /// Greeting sent to a client when its connection is accepted
    pub fn connected(connection_id: u64) -> Self {
        let mut envelope = Self::new(kind::CONNECTED);
        envelope.payload = Some(json!({
            "message": "connected to store sync relay",
            "connection_id": connection_id,
        }));
        envelope
    }

    /// Parse and validate an inbound text frame
    ///
    /// Rejects frames that are not a JSON object with a string `type`.
    /// Extra fields are accepted; the caller is expected to forward the
    /// original text, not a re-serialization.
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize for sending
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_frame() {
        let envelope = Envelope::decode(r#"{"type":"PRODUCTS_UPDATED"}"#).unwrap();
        assert_eq!(envelope.kind, kind::PRODUCTS_UPDATED);
        assert!(envelope.timestamp.is_none());
        assert!(envelope.source.is_none());
        assert!(envelope.payload.is_none());
    }

    #[test]
    fn test_decode_full_frame() {
        let text = r#"{"type":"TEST","timestamp":1700000000000,"source":"A","payload":{"n":1}}"#;
        let envelope = Envelope::decode(text).unwrap();
        assert_eq!(envelope.kind, "TEST");
        assert_eq!(envelope.timestamp, Some(1_700_000_000_000));
        assert_eq!(envelope.source.as_deref(), Some("A"));
        assert_eq!(envelope.payload, Some(json!({"n": 1})));
    }

    #[test]
    fn test_decode_accepts_unknown_kind_and_extra_fields() {
        let envelope =
            Envelope::decode(r#"{"type":"SOMETHING_ELSE","extra":true}"#).unwrap();
        assert_eq!(envelope.kind, "SOMETHING_ELSE");
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        assert!(Envelope::decode(r#"{"payload":{}}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(Envelope::decode("[1,2,3]").is_err());
        assert!(Envelope::decode("not json at all").is_err());
    }

    #[test]
    fn test_encode_skips_absent_fields() {
        let envelope = Envelope {
            kind: "TEST".to_string(),
            timestamp: None,
            source: None,
            payload: None,
        };
        assert_eq!(envelope.to_json().unwrap(), r#"{"type":"TEST"}"#);
    }

    #[test]
    fn test_connected_greeting_shape() {
        let envelope = Envelope::connected(7);
        assert_eq!(envelope.kind, kind::CONNECTED);
        assert!(envelope.timestamp.is_some());

        let payload = envelope.payload.unwrap();
        assert_eq!(payload["connection_id"], 7);
    }
}
