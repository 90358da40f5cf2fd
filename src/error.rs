//! Error types for sandstorm-rcon
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RconError
pub type Result<T> = std::result::Result<T, RconError>;

/// Unified error type for RCON client operations
#[derive(Debug, Error)]
pub enum RconError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// I/O failure or read timeout on the underlying stream
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    /// Stream ended before the requested number of bytes arrived
    #[error("Truncated read: expected {expected} bytes, got {received}")]
    Truncated { expected: usize, received: usize },

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected packet type {packet_type} for request {id}")]
    UnexpectedPacketType { id: i32, packet_type: i32 },

    #[error("Authentication failed")]
    AuthenticationFailed,

    /// A command exchange aborted after it started; `partial` holds whatever
    /// response text had been assembled before the failure
    #[error("Exchange interrupted after {} bytes of response: {source}", .partial.len())]
    Interrupted {
        partial: String,
        #[source]
        source: Box<RconError>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RconError {
    /// True when the error (or the error behind an interrupted exchange) is a
    /// read timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            RconError::Transport(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            RconError::Interrupted { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Partially assembled response text, if this error came from an
    /// interrupted exchange
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            RconError::Interrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
