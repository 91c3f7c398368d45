//! embed-bootstrap library crate.
//!
//! Mounts a sandboxed iframe hosting a remote chat application into a host
//! page, then relays UI-state and navigation events between the page and the
//! frame over `window.postMessage`.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host page (JavaScript)
//!         ↕  new EmbeddedMessaging(options).init(agentId, domainUrl, siteUrl, snippet)
//! [embed-bootstrap]
//!   ├── application/        Startup sequence and message relay, written
//!   │     ├── controller     against the HostPage port
//!   │     ├── frame_mount
//!   │     ├── resource_loader
//!   │     ├── message_bridge
//!   │     └── host           HostPage trait, load signals, HostError
//!   └── infrastructure/
//!         ├── dom/mock       In-memory page used by the tests
//!         ├── dom/web        web-sys adapter (wasm32 only)
//!         ├── logging        tracing-subscriber → browser console
//!         └── bindings       #[wasm_bindgen] entry object (wasm32 only)
//!         ↕  window.postMessage
//! Embedded chat frame
//! ```
//!
//! # Layer rules
//!
//! - `embed-core` holds the domain (settings, origin, wire protocol).
//! - `application` depends on `embed-core` and the `HostPage` trait only; it
//!   never names a browser type.
//! - `infrastructure` implements the trait and owns every `wasm-bindgen`,
//!   `web-sys` and `js-sys` import.

/// Application layer: startup sequence, frame mount, stylesheet, bridge.
pub mod application;

/// Infrastructure layer: page adapters, logging and the JS entry point.
pub mod infrastructure;

pub use application::{Bootstrap, InitError, MessageBridge, Phase, SendOutcome};
