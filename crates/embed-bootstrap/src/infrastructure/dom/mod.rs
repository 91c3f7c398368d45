//! [`HostPage`](crate::application::host::HostPage) implementations.
//!
//! - `mock` – in-memory page, always compiled so integration tests can use it
//! - `web`  – `web-sys` adapter, compiled for `wasm32` only

pub mod mock;

#[cfg(target_arch = "wasm32")]
pub mod web;
