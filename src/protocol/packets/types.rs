//! RCON packet types and wire constants.

// ============================================================================
// Wire layout
// ============================================================================

/// Bytes in the fixed response/request prefix: size, request ID, type.
pub const HEADER_SIZE: usize = 12;

/// Bytes counted by the `size` field besides the payload:
/// request ID (4) + type (4) + two null terminators (2).
pub const ENVELOPE_SIZE: usize = 10;

/// Null terminator bytes following every payload.
pub const PADDING_SIZE: usize = 2;

/// Ceiling for the `size` field of a request. Requests must stay below it.
pub const MAX_PACKET_SIZE: usize = 1460;

/// Largest payload that still fits under [`MAX_PACKET_SIZE`].
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - ENVELOPE_SIZE - 1;

/// Request ID the server answers with when the password is wrong.
pub const BAD_LOGIN_ID: i32 = -1;

/// Request ID used on every client packet.
pub const CLIENT_REQUEST_ID: i32 = 0;

// ============================================================================
// Packet types
// ============================================================================

/// Client -> Server: authenticate with the RCON password.
pub const SERVERDATA_AUTH: i32 = 3;
/// Server -> Client: reply to an auth request.
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
/// Client -> Server: execute a console command.
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
/// Server -> Client: command output.
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// Packet types the client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PacketType {
    Command = SERVERDATA_EXECCOMMAND,
    Auth = SERVERDATA_AUTH,
}

impl PacketType {
    pub fn to_id(self) -> i32 {
        self as i32
    }
}

/// Get a human-readable name for a packet type as seen on the wire.
///
/// Type 2 means "execute command" from the client and "auth response"
/// from the server, so the direction matters.
pub fn packet_type_name(packet_type: i32, from_server: bool) -> &'static str {
    match (packet_type, from_server) {
        (SERVERDATA_AUTH, false) => "SERVERDATA_AUTH",
        (SERVERDATA_EXECCOMMAND, false) => "SERVERDATA_EXECCOMMAND",
        (SERVERDATA_AUTH_RESPONSE, true) => "SERVERDATA_AUTH_RESPONSE",
        (SERVERDATA_RESPONSE_VALUE, true) => "SERVERDATA_RESPONSE_VALUE",
        _ => "UNKNOWN",
    }
}
