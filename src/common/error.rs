//! Error types for the application.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// RCON protocol errors.
///
/// Every variant is returned to the immediate caller; the client never
/// retries on its own.
#[derive(Debug, Error)]
pub enum RconError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out connecting to {host}:{port} after {timeout:?}")]
    Timeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Packet too large: {size} bytes (limit is {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RconError {
    pub(crate) fn truncated(needed: usize, got: usize) -> Self {
        Self::Protocol {
            message: format!("response truncated: need {} bytes, got {}", needed, got),
        }
    }
}

/// Stage of an outbound RCON session at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Connect,
    Authenticate,
    Command,
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Authenticate => "authenticate",
            Self::Command => "send command",
        };
        f.write_str(name)
    }
}

/// Relay orchestrator errors.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("RCON session failed to {stage}: {source}")]
    Session {
        stage: SessionStage,
        #[source]
        source: RconError,
    },

    #[error("Failed to follow console log '{path}': {source}")]
    Follow {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Console follow task for '{path}' did not finish: {source}")]
    FollowTask {
        path: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Unexpected reply to '{command}': {reply}")]
    UnexpectedReply { command: String, reply: String },
}

impl RelayError {
    pub(crate) fn session(stage: SessionStage) -> impl FnOnce(RconError) -> Self {
        move |source| Self::Session { stage, source }
    }

    /// Text that is safe to show to the chat user who triggered the failure.
    ///
    /// Transport errors never include the server address.
    pub fn user_message(&self) -> String {
        match self {
            Self::Session { source, .. } => match source {
                RconError::Connection { source, .. } => {
                    let detail = sanitize_transport_error(&source.to_string());
                    format!("Unable to reach the server: {}", detail)
                }
                RconError::Timeout { .. } => {
                    "Unable to reach the server: connection timed out".to_string()
                }
                RconError::Authentication { .. } => {
                    "The server rejected the RCON password".to_string()
                }
                RconError::Io(e) => {
                    let detail = sanitize_transport_error(&e.to_string());
                    format!("Lost connection to the server: {}", detail)
                }
                other => other.to_string(),
            },
            Self::Follow { .. } | Self::FollowTask { .. } => {
                "The console log is unavailable".to_string()
            }
            Self::UnexpectedReply { .. } => "The server sent an unexpected reply".to_string(),
        }
    }
}

fn names_socket_addr(message: &str) -> bool {
    message
        .split_whitespace()
        .map(|word| word.trim_end_matches(':'))
        .any(|word| word.parse::<SocketAddr>().is_ok())
}

/// Strip leading `dial tcp <addr>:`-style segments from a transport error.
///
/// Keeps only the text after the last `": "` when the message names an
/// address, so "connect 10.0.0.5:25575: connection refused" becomes
/// "connection refused".
pub fn sanitize_transport_error(message: &str) -> String {
    let looks_addressed = message.starts_with("dial tcp")
        || message.starts_with("connect ")
        || names_socket_addr(message);

    if !looks_addressed {
        return message.to_string();
    }

    match message.rfind(": ") {
        Some(idx) => message[idx + 2..].trim().to_string(),
        None => message.to_string(),
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for RCON operations.
pub type RconResult<T> = std::result::Result<T, RconError>;

/// Result type alias for relay operations.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_dial_prefix() {
        let msg = "dial tcp 127.0.0.1:25575: connect: connection refused";
        assert_eq!(sanitize_transport_error(msg), "connection refused");
    }

    #[test]
    fn test_sanitize_strips_socket_address() {
        let msg = "failed to reach 10.0.0.5:25575: host unreachable";
        assert_eq!(sanitize_transport_error(msg), "host unreachable");
    }

    #[test]
    fn test_sanitize_leaves_plain_messages() {
        assert_eq!(
            sanitize_transport_error("Connection refused (os error 111)"),
            "Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_user_message_hides_address() {
        let err = RelayError::Session {
            stage: SessionStage::Connect,
            source: RconError::Connection {
                host: "10.0.0.5".to_string(),
                port: 25575,
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ),
            },
        };

        let text = err.user_message();
        assert!(!text.contains("10.0.0.5"));
        assert!(text.contains("connection refused"));
        // The log-facing Display still names the target
        assert!(err.to_string().contains("10.0.0.5:25575"));
    }

    #[test]
    fn test_user_message_for_bad_password() {
        let err = RelayError::Session {
            stage: SessionStage::Authenticate,
            source: RconError::Authentication {
                reason: "bad password".to_string(),
            },
        };
        assert_eq!(err.user_message(), "The server rejected the RCON password");
    }
}
