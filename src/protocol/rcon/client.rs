//! RCON client connection.
//!
//! A [`Connection`] walks a strict state machine:
//!
//! ```text
//! Disconnected --connect--> Connected --authenticate--> Authenticated
//! ```
//!
//! Only an authenticated connection may send commands. There is no way back
//! to an earlier state; [`Connection::close`] consumes the connection, so it
//! cannot be closed twice or used afterwards.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::common::error::{RconError, RconResult};
use crate::protocol::packets::{Packet, HEADER_SIZE};
use crate::protocol::rcon::connector::{dial, new_rcon_stream, RconStream};

/// Observable state of a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Authenticated,
}

impl ConnectionState {
    fn describe(self) -> &'static str {
        match self {
            Self::Connected => "not authenticated",
            Self::Authenticated => "already authenticated",
        }
    }
}

/// One RCON session over a single stream.
pub struct Connection<S = TcpStream> {
    stream: RconStream<S>,
    authenticated: bool,
}

impl Connection<TcpStream> {
    /// Dial `host:port`, giving up after `timeout`. Does not authenticate.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> RconResult<Self> {
        let stream = dial(host, port, timeout).await?;
        info!("Connected to RCON at {}:{}", host, port);
        Ok(Self::from_stream(stream))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-open stream in the `Connected` state.
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream: new_rcon_stream(stream),
            authenticated: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.authenticated {
            ConnectionState::Authenticated
        } else {
            ConnectionState::Connected
        }
    }

    /// Authenticate with the RCON password.
    ///
    /// On rejection the connection stays open and unauthenticated; the
    /// caller decides whether to try again or close.
    pub async fn authenticate(&mut self, password: &str) -> RconResult<()> {
        if self.authenticated {
            return Err(RconError::InvalidState {
                operation: "authenticate",
                state: self.state().describe(),
            });
        }

        let response = self.exchange(Packet::auth(password)?).await?;

        if response.is_auth_rejected() {
            let body = response.body_text();
            warn!("RCON authentication rejected");
            let reason = if body.is_empty() {
                "server rejected the password".to_string()
            } else {
                format!("server rejected the password: {}", body)
            };
            return Err(RconError::Authentication { reason });
        }

        self.authenticated = true;
        debug!("RCON authentication accepted");
        Ok(())
    }

    /// Run one console command and return its output.
    ///
    /// The size check happens before anything is written.
    pub async fn send_command(&mut self, command: &str) -> RconResult<String> {
        if !self.authenticated {
            return Err(RconError::InvalidState {
                operation: "send a command",
                state: self.state().describe(),
            });
        }

        let packet = Packet::command(command)?;
        let response = self.exchange(packet).await?;

        if response.is_auth_rejected() {
            return Err(RconError::Authentication {
                reason: "server refused the command: bad auth".to_string(),
            });
        }

        Ok(response.body_text())
    }

    /// Shut the stream down. Consumes the connection.
    pub async fn close(self) -> RconResult<()> {
        let mut inner = self.stream.into_inner();
        inner.shutdown().await?;
        debug!("RCON connection closed");
        Ok(())
    }

    /// Write one packet and read exactly one reply.
    async fn exchange(&mut self, packet: Packet) -> RconResult<Packet> {
        self.stream.send(packet).await?;

        match self.stream.next().await {
            Some(result) => result,
            None => Err(RconError::truncated(HEADER_SIZE, 0)),
        }
    }
}
