//! Application layer for embed-bootstrap.
//!
//! Everything here is written against the [`HostPage`] port and runs on a
//! single-threaded event loop, which is why shared state lives in `Rc` and
//! `Cell` rather than `Arc` and locks.
//!
//! # Modules
//!
//! - **`controller`** – [`Bootstrap`]: the once-per-page `init` and the
//!   startup future.
//! - **`frame_mount`** – Builds and inserts the container and the sandboxed
//!   iframe.
//! - **`resource_loader`** – Attaches the companion stylesheet.
//! - **`message_bridge`** – [`MessageBridge`]: outbound `send`, inbound
//!   dispatch of resize and link-click messages.
//! - **`host`** – The [`HostPage`] trait and the load signal types.

pub mod controller;
pub mod frame_mount;
pub mod host;
pub mod message_bridge;
pub mod resource_loader;

mod context;

pub use controller::{Bootstrap, InitError, Phase};
pub use frame_mount::{FrameHandle, MountError};
pub use host::{HostError, HostPage, LoadError, LoadNotifier, LoadSignal, MessageHandler};
pub use message_bridge::{BridgeError, Dispatched, MessageBridge, SendOutcome};
pub use resource_loader::ResourceError;
