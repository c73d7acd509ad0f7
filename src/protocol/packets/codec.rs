//! RCON packet encoding and decoding.
//!
//! Layout (little-endian):
//!
//! ```text
//! int32 size | int32 request_id | int32 type | payload | 0x00 0x00
//! ```
//!
//! `size` counts everything after itself, so it equals `payload.len() + 10`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::common::error::{RconError, RconResult};
use crate::protocol::packets::types::{
    PacketType, BAD_LOGIN_ID, CLIENT_REQUEST_ID, ENVELOPE_SIZE, HEADER_SIZE, MAX_PACKET_SIZE,
    MAX_PAYLOAD_SIZE, PADDING_SIZE,
};

/// An RCON protocol packet.
///
/// `packet_type` is kept raw because servers answer with types the client
/// never sends (e.g. `SERVERDATA_RESPONSE_VALUE = 0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub packet_type: i32,
    pub payload: Bytes,
}

impl Packet {
    /// Create a client packet, rejecting payloads that would reach the size ceiling.
    pub fn new(packet_type: PacketType, payload: impl Into<Bytes>) -> RconResult<Self> {
        let packet = Self {
            request_id: CLIENT_REQUEST_ID,
            packet_type: packet_type.to_id(),
            payload: payload.into(),
        };
        packet.check_size()?;
        Ok(packet)
    }

    /// Auth packet carrying the password.
    pub fn auth(password: &str) -> RconResult<Self> {
        Self::new(PacketType::Auth, Bytes::copy_from_slice(password.as_bytes()))
    }

    /// Command packet carrying one console command.
    pub fn command(command: &str) -> RconResult<Self> {
        Self::new(PacketType::Command, Bytes::copy_from_slice(command.as_bytes()))
    }

    /// Value of the `size` field for this packet.
    pub fn size_field(&self) -> usize {
        self.payload.len() + ENVELOPE_SIZE
    }

    /// Number of bytes this packet occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        self.size_field() + 4
    }

    /// True if the server flagged this reply with the bad-login sentinel.
    pub fn is_auth_rejected(&self) -> bool {
        self.request_id == BAD_LOGIN_ID
    }

    /// Payload decoded as text. Invalid UTF-8 is replaced, never rejected.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    fn check_size(&self) -> RconResult<()> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RconError::PacketTooLarge {
                size: self.size_field(),
                max: MAX_PACKET_SIZE - 1,
            });
        }
        Ok(())
    }

    /// Write the packet to `buf`.
    ///
    /// Fails without touching `buf` if the packet exceeds the ceiling.
    pub fn encode(&self, buf: &mut BytesMut) -> RconResult<()> {
        self.check_size()?;

        buf.reserve(self.encoded_len());
        buf.put_i32_le(self.size_field() as i32);
        buf.put_i32_le(self.request_id);
        buf.put_i32_le(self.packet_type);
        buf.put_slice(&self.payload);
        buf.put_bytes(0, PADDING_SIZE);

        Ok(())
    }

    /// Try to take one complete packet off the front of `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Responses are not
    /// subject to the request ceiling.
    pub fn decode(buf: &mut BytesMut) -> RconResult<Option<Self>> {
        let Some(total) = frame_length(&buf[..])? else {
            return Ok(None);
        };
        if buf.len() < total {
            return Ok(None);
        }

        let mut frame = buf.split_to(total);
        let size = frame.get_i32_le() as usize;
        let request_id = frame.get_i32_le();
        let packet_type = frame.get_i32_le();

        // Body is size - 8 bytes; the last two are the null terminators.
        let body_len = size - 8;
        let payload = frame.split_to(body_len - PADDING_SIZE).freeze();

        Ok(Some(Self {
            request_id,
            packet_type,
            payload,
        }))
    }

    /// Bytes still required before `buf` holds a complete packet.
    pub fn bytes_needed(buf: &[u8]) -> usize {
        if buf.len() < HEADER_SIZE {
            return HEADER_SIZE;
        }
        let size = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if size < ENVELOPE_SIZE as i32 {
            return HEADER_SIZE;
        }
        size as usize + 4
    }
}

/// Total frame length announced by the header in `buf`, if the header is complete.
fn frame_length(buf: &[u8]) -> RconResult<Option<usize>> {
    if buf.len() < HEADER_SIZE {
        return Ok(None);
    }

    let size = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if size < ENVELOPE_SIZE as i32 {
        return Err(RconError::Protocol {
            message: format!("invalid packet size {} (minimum {})", size, ENVELOPE_SIZE),
        });
    }

    Ok(Some(size as usize + 4))
}
