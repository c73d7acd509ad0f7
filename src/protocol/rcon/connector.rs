//! RCON TCP connection and codec.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::debug;

use crate::common::error::{RconError, RconResult};
use crate::protocol::packets::{packet_type_name, Packet};

/// Default time allowed for the TCP handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Codec for RCON packets.
///
/// Decoding never reassembles replies split over several packets: each
/// frame is handed out as its own [`Packet`].
#[derive(Debug, Default)]
pub struct RconCodec;

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let packet = Packet::decode(src)?;
        if let Some(ref packet) = packet {
            debug!(
                request_id = packet.request_id,
                "Received {} ({} byte payload)",
                packet_type_name(packet.packet_type, true),
                packet.payload.len()
            );
        }
        Ok(packet)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(packet) => Ok(Some(packet)),
            None if buf.is_empty() => Ok(None),
            None => Err(RconError::truncated(Packet::bytes_needed(buf), buf.len())),
        }
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = RconError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst)?;
        debug!(
            "Sending {} ({} bytes)",
            packet_type_name(item.packet_type, false),
            item.encoded_len()
        );
        Ok(())
    }
}

/// A framed RCON connection.
pub type RconStream<S> = Framed<S, RconCodec>;

/// Create a new framed RCON stream from any byte stream.
pub fn new_rcon_stream<S: AsyncRead + AsyncWrite>(stream: S) -> RconStream<S> {
    Framed::new(stream, RconCodec)
}

/// Open a TCP connection to an RCON server within `timeout`.
pub async fn dial(host: &str, port: u16, timeout: Duration) -> RconResult<TcpStream> {
    debug!("Dialing RCON server at {}:{}", host, port);

    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            // Requests are single small writes; don't let Nagle hold them back
            stream.set_nodelay(true)?;
            Ok(stream)
        }
        Ok(Err(source)) => Err(RconError::Connection {
            host: host.to_string(),
            port,
            source,
        }),
        Err(_) => Err(RconError::Timeout {
            host: host.to_string(),
            port,
            timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    #[test]
    fn test_codec_round_trip() {
        let mut codec = RconCodec;
        let mut buf = BytesMut::new();

        let packet = Packet::command("say hi").unwrap();
        codec.encode(packet, &mut buf).unwrap();
        let packet = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(packet.body_text(), "say hi");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_with_partial_frame() {
        let mut codec = RconCodec;
        let mut buf = BytesMut::new();
        buf.put_i32_le(100);
        buf.put_i32_le(0);
        buf.put_i32_le(0);
        buf.put_slice(b"only a few bytes");

        match codec.decode_eof(&mut buf) {
            Err(RconError::Protocol { message }) => {
                assert!(message.contains("need 104"));
                assert!(message.contains("got 28"));
            }
            other => panic!("expected Protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_eof_clean() {
        let mut codec = RconCodec;
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dial_refused() {
        // Grab a free port, then release it so nothing is listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        match dial("127.0.0.1", port, DEFAULT_CONNECT_TIMEOUT).await {
            Err(RconError::Connection { port: p, .. }) => assert_eq!(p, port),
            other => panic!("expected Connection error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dial_success() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let timeout = Duration::from_secs(1);
        let stream = dial("127.0.0.1", port, timeout).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }
}
