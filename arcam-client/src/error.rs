//! Error types for the client.

use thiserror::Error;

use arcam_protocol::{InvalidArgument, ProtocolError};

/// Errors surfaced by [`crate::Connection`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Could not establish the socket, or lost it mid-operation.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The operation requires an established connection.
    #[error("not connected to device")]
    NotConnected,

    /// No complete reply within the configured window.
    #[error("command timed out")]
    Timeout,

    /// Received bytes do not form a valid frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Caller-supplied value rejected before reaching the wire.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}
