//! Protocol module containing the cross-frame message types and their JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_inbound, encode_outbound, validate_method, ProtocolError};
pub use messages::*;
