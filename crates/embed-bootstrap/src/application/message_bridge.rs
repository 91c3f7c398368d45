//! Message bridge: the relay between the host page and the embedded frame.
//!
//! # Outbound
//!
//! [`MessageBridge::send`] wraps `method` and `data` in an envelope and posts
//! it to the frame window, scoped to the resolved site origin.  Nothing is
//! queued: before the frame exists the call reports
//! [`SendOutcome::FrameUnavailable`], so callers that need ordering await the
//! frame mount first.
//!
//! # Inbound
//!
//! One page-level `message` listener feeds [`MessageBridge::dispatch`]:
//!
//! | `type`                    | Effect                                              |
//! |---------------------------|-----------------------------------------------------|
//! | `resize`                  | width/height styles, then one visual state change   |
//! | `text_message_link_click` | navigates through a transient anchor                |
//! | anything else             | logged as unrecognized                              |
//!
//! The sender's origin is not checked before dispatch.  Integrations rely on
//! that during development; see DESIGN.md for the hardening note.

use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use embed_core::protocol::messages::{LinkClick, ResizeRequest};
use embed_core::{
    decode_inbound, encode_outbound, resolve_origin, InboundMessage, OriginError,
    OutboundEnvelope, ProtocolError, Settings, VisualState,
};

use crate::application::context::EmbedContext;
use crate::application::host::{HostError, HostPage};

/// `rel` of every synthesized anchor.  Keeps `window.opener` null in the new
/// tab and sends no referrer.
pub const LINK_REL: &str = "noopener noreferrer";

/// Errors reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The caller passed a malformed method name.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ProtocolError),

    /// No usable target origin; nothing was posted.
    #[error("refusing to post without a trusted origin: {0}")]
    MissingOrigin(#[from] OriginError),

    /// A page operation failed while applying or posting a message.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result of an outbound send that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    Delivered,
    /// The frame is not mounted (or has no window); the message was dropped.
    FrameUnavailable,
}

/// What an inbound message did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// A resize was applied; carries the visual state it switched to, if any.
    Resized(Option<VisualState>),
    /// A link navigation was triggered.
    LinkOpened { new_tab: bool },
    /// A recognized message that had nothing to act on.
    Ignored,
    /// An unrecognized `type`.
    Unrecognized(Option<String>),
}

/// Bidirectional relay bound to one bootstrap context.
pub struct MessageBridge<P: HostPage> {
    ctx: Rc<EmbedContext<P>>,
}

impl<P: HostPage> Clone for MessageBridge<P> {
    fn clone(&self) -> Self {
        Self {
            ctx: Rc::clone(&self.ctx),
        }
    }
}

impl<P: HostPage> MessageBridge<P> {
    pub(crate) fn new(ctx: Rc<EmbedContext<P>>) -> Self {
        Self { ctx }
    }

    // ── Outbound ──────────────────────────────────────────────────────────────

    /// Posts `{ method, data? }` to the embedded frame.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidArgument`] if `method` is not a non-empty identifier.
    /// - [`BridgeError::MissingOrigin`] if the settings give no usable origin.
    /// - [`BridgeError::Host`] if the page rejected the post.
    pub fn send(&self, method: &str, data: Option<Value>) -> Result<SendOutcome, BridgeError> {
        let message = encode_outbound(&OutboundEnvelope::new(method, data))?;

        let origin = resolve_origin(self.ctx.settings.get()).map_err(|e| {
            error!("not posting `{method}` to the embedded frame: {e}");
            e
        })?;

        let Some(frame) = self.ctx.frame.get() else {
            warn!("embedded frame not available for post message with method {method}");
            return Ok(SendOutcome::FrameUnavailable);
        };

        match self
            .ctx
            .page
            .post_message(frame.element(), &message, origin.as_str())
        {
            Ok(()) => {
                debug!("posted `{method}` to {}", origin.as_str());
                Ok(SendOutcome::Delivered)
            }
            Err(HostError::WindowUnavailable) => {
                warn!("embedded frame window gone; dropped post message with method {method}");
                Ok(SendOutcome::FrameUnavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    /// Registers the page-level listener that feeds [`Self::dispatch`].
    ///
    /// Only the first call registers anything.
    ///
    /// # Errors
    ///
    /// Returns the page error if the listener could not be attached.
    pub fn register_listener(&self) -> Result<(), HostError> {
        if self.ctx.listener_registered.get() {
            warn!("inbound message listener already registered; not adding another");
            return Ok(());
        }

        let bridge = self.clone();
        self.ctx
            .page
            .add_message_listener(Box::new(move |data: Value| {
                if let Err(e) = bridge.dispatch(&data) {
                    error!("failed to handle message from the embedded frame: {e}");
                }
            }))?;

        self.ctx.listener_registered.set(true);
        debug!("inbound message listener registered");
        Ok(())
    }

    /// Applies one received message to the page.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Host`] if a page operation failed part-way.
    pub fn dispatch(&self, raw: &Value) -> Result<Dispatched, BridgeError> {
        match decode_inbound(raw) {
            InboundMessage::Resize(resize) => self.apply_resize(&resize),
            InboundMessage::LinkClick(click) => self.open_link(&click),
            InboundMessage::Unrecognized { kind } => {
                warn!(
                    "unrecognized postMessage event name: {}",
                    kind.as_deref().unwrap_or("<none>")
                );
                Ok(Dispatched::Unrecognized(kind))
            }
        }
    }

    fn apply_resize(&self, resize: &ResizeRequest) -> Result<Dispatched, BridgeError> {
        let Some(frame) = self.ctx.frame.get() else {
            debug!("resize received before the frame was mounted");
            return Ok(Dispatched::Ignored);
        };
        let page = &self.ctx.page;
        let element = frame.element();

        if let Some(width) = resize.width() {
            page.set_style(element, "width", width)?;
        }
        if let Some(height) = resize.height() {
            page.set_style(element, "height", height)?;
        }

        let state = resize.visual_state();
        match (state, resize.state.as_deref()) {
            (Some(state), _) => {
                for class in state.replaced_classes() {
                    page.remove_class(element, class)?;
                }
                page.add_class(element, state.class_name())?;
                debug!("frame visual state is now {state}");
            }
            (None, Some(unknown)) => debug!("ignoring unknown visual state `{unknown}`"),
            (None, None) => {}
        }

        Ok(Dispatched::Resized(state))
    }

    fn open_link(&self, click: &LinkClick) -> Result<Dispatched, BridgeError> {
        let Some(link) = click.link() else {
            debug!("link click message carried no link");
            return Ok(Dispatched::Ignored);
        };
        let page = &self.ctx.page;

        // The mobile host application handles navigation itself and expects a
        // new browsing context.
        let same_tab = self
            .ctx
            .settings
            .get()
            .is_some_and(Settings::opens_links_in_same_tab);
        let new_tab = page.is_mobile_host_app() || !same_tab;

        let anchor = page.create_element("a")?;
        page.set_attribute(&anchor, "href", link)?;
        page.set_attribute(&anchor, "rel", LINK_REL)?;
        if new_tab {
            page.set_attribute(&anchor, "target", "_blank")?;
        }
        page.click(&anchor)?;

        info!(new_tab, "opened link from chat message");
        Ok(Dispatched::LinkOpened { new_tab })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
