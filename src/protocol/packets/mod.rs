//! Packet definitions and codecs.

pub mod codec;
pub mod types;

pub use codec::*;
pub use types::*;
