//! Infrastructure layer for embed-bootstrap.
//!
//! Owns every browser binding.  The application layer only sees the
//! `HostPage` trait that `dom` implements.

pub mod dom;
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub mod bindings;
