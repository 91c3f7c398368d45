//! JSON codec for the cross-frame protocol.
//!
//! Decoding never fails: whatever the frame (or any other script on the page)
//! posts, [`decode_inbound`] returns a message the bridge can dispatch on.
//! Encoding validates the method name before anything reaches the frame.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{
    InboundMessage, LinkClick, OutboundEnvelope, ResizeRequest, LINK_CLICK_TYPE, RESIZE_TYPE,
};

/// Errors that can occur while encoding an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The method name is empty or contains characters outside
    /// `[A-Za-z0-9_.-]`.
    #[error("expected a non-empty identifier as the message method, got {0:?}")]
    InvalidMethod(String),

    /// The envelope could not be turned into JSON.
    #[error("envelope serialization failed: {0}")]
    Serialization(String),
}

/// Checks that `method` is a non-empty identifier.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidMethod`] otherwise.
pub fn validate_method(method: &str) -> Result<(), ProtocolError> {
    let valid = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ProtocolError::InvalidMethod(method.to_string()))
    }
}

/// Decodes the `data` of a received message event.
///
/// # Examples
///
/// ```rust
/// use embed_core::{decode_inbound, InboundMessage};
/// use serde_json::json;
///
/// let msg = decode_inbound(&json!({"type": "chat_opened"}));
/// assert_eq!(msg, InboundMessage::Unrecognized { kind: Some("chat_opened".to_string()) });
/// ```
pub fn decode_inbound(value: &Value) -> InboundMessage {
    let kind = value.get("type").and_then(Value::as_str);

    match kind {
        Some(RESIZE_TYPE) => InboundMessage::Resize(
            serde_json::from_value::<ResizeRequest>(value.clone()).unwrap_or_default(),
        ),
        Some(LINK_CLICK_TYPE) => InboundMessage::LinkClick(
            serde_json::from_value::<LinkClick>(value.clone()).unwrap_or_default(),
        ),
        other => InboundMessage::Unrecognized {
            kind: other.map(str::to_string),
        },
    }
}

/// Encodes an envelope into the JSON value handed to `postMessage`.
///
/// # Errors
///
/// [`ProtocolError::InvalidMethod`] for a bad method name,
/// [`ProtocolError::Serialization`] if serde fails.
pub fn encode_outbound(envelope: &OutboundEnvelope) -> Result<Value, ProtocolError> {
    validate_method(&envelope.method)?;
    serde_json::to_value(envelope).map_err(|e| ProtocolError::Serialization(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
