//! # embed-core
//!
//! Shared library for the embedded messaging bootstrap containing the
//! page-scoped settings model, the origin rules that scope every cross-frame
//! post, and the JSON wire protocol spoken with the embedded chat frame.
//!
//! It has zero dependencies on the DOM, `wasm-bindgen`, or an async runtime,
//! so everything here compiles and tests natively.
//!
//! # Architecture overview
//!
//! The bootstrap injects a sandboxed iframe that hosts a remote chat
//! application into a host page, then relays a handful of events between the
//! two documents with `window.postMessage`.  This crate defines:
//!
//! - **`domain`** – Settings (what the host page passed to `init`), the
//!   [`SiteOrigin`] that is both the iframe location and the only target
//!   origin messages may be posted to, the four [`VisualState`]s of the
//!   widget, and the blueprint for the iframe element.
//!
//! - **`protocol`** – The messages themselves: [`InboundMessage`] (frame →
//!   host, discriminated by `type`) and [`OutboundEnvelope`] (host → frame,
//!   `{ method, data? }`), plus the codec that maps them to and from JSON.

pub mod domain;
pub mod protocol;

pub use domain::config::{BootstrapOptions, MountTarget};
pub use domain::frame::FrameBlueprint;
pub use domain::origin::{resolve_origin, OriginError, SiteOrigin};
pub use domain::settings::{InitRequest, Settings};
pub use domain::visual_state::VisualState;
pub use protocol::codec::{decode_inbound, encode_outbound, ProtocolError};
pub use protocol::messages::{InboundMessage, OutboundEnvelope};
