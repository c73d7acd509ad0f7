//! RCON wire protocol: packet framing and the client connection.

pub mod packets;
pub mod rcon;
