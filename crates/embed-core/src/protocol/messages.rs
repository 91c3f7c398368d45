//! Message types exchanged with the embedded frame over `window.postMessage`.
//!
//! # Message flow
//!
//! ```text
//! Frame → Host:  { "type": "resize", ... }                   → InboundMessage::Resize
//!                { "type": "text_message_link_click", ... }  → InboundMessage::LinkClick
//!                anything else                               → InboundMessage::Unrecognized
//! Host  → Frame: OutboundEnvelope → { "method": "...", "data": { ... } }
//! ```
//!
//! The host page does not validate payloads beyond the `type` discriminant.
//! Fields of the wrong JSON type are read as absent instead of rejecting the
//! whole message.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::visual_state::VisualState;

/// `type` of a resize request.
pub const RESIZE_TYPE: &str = "resize";

/// `type` of a link click inside a chat message.
pub const LINK_CLICK_TYPE: &str = "text_message_link_click";

/// Method of the configuration message sent once the frame has loaded.
pub const SET_CONFIG_METHOD: &str = "ESW_SET_CONFIG_EVENT";

// ── Frame → Host messages ─────────────────────────────────────────────────────

/// A message received from the embedded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// The app wants the frame resized and/or moved to another visual state.
    Resize(ResizeRequest),

    /// The user clicked a link in a chat message.
    LinkClick(LinkClick),

    /// Any other `type`.  `kind` is `None` when the message had no string
    /// `type` at all (for example a plain string posted by another script).
    Unrecognized { kind: Option<String> },
}

/// Payload of a `resize` message.
///
/// ```json
/// {"type":"resize","width":"360px","height":"600px","state":"normal"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResizeRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<String>,
    /// Raw requested state; see [`ResizeRequest::visual_state`].
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
}

impl ResizeRequest {
    /// Width to apply, ignoring empty strings.
    pub fn width(&self) -> Option<&str> {
        self.width.as_deref().filter(|w| !w.is_empty())
    }

    /// Height to apply, ignoring empty strings.
    pub fn height(&self) -> Option<&str> {
        self.height.as_deref().filter(|h| !h.is_empty())
    }

    /// The requested state if it names one of the four modes.
    pub fn visual_state(&self) -> Option<VisualState> {
        self.state.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Payload of a `text_message_link_click` message.
///
/// ```json
/// {"type":"text_message_link_click","data":{"link":"https://x.test"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkClick {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<LinkData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkData {
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,
}

impl LinkClick {
    /// The clicked link, if present and non-empty.
    pub fn link(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.link.as_deref())
            .filter(|link| !link.is_empty())
    }
}

/// Reads a field as `Some` only when it has the expected JSON type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ── Host → Frame messages ─────────────────────────────────────────────────────

/// The envelope posted to the frame window.
///
/// `data` is omitted from the JSON entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEnvelope {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OutboundEnvelope {
    pub fn new(method: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            method: method.into(),
            data,
        }
    }

    /// The `ESW_SET_CONFIG_EVENT` message carrying the merged configuration.
    pub fn set_config(config: Map<String, Value>) -> Self {
        Self::new(SET_CONFIG_METHOD, Some(Value::Object(config)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
