//! Error types for the Arcam control protocol.

use thiserror::Error;

/// Framing violations detected while decoding or reading frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame shorter than the minimum response (header plus end byte).
    #[error("frame too short: {0} bytes (minimum 6)")]
    FrameTooShort(usize),

    /// First byte is not the start sentinel.
    #[error("invalid start byte: 0x{0:02X}")]
    InvalidStartByte(u8),

    /// Last byte is not the end sentinel.
    #[error("invalid end byte: 0x{0:02X}")]
    InvalidEndByte(u8),

    /// Declared data length does not match the frame size.
    #[error("data length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Peer closed or stalled before a full read completed.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Caller-supplied values rejected at command construction, before anything
/// reaches the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// Zone outside the device's range.
    #[error("invalid zone: {0} (must be 1 or 2)")]
    Zone(u8),

    /// Volume outside the direct-set range.
    #[error("invalid volume: {0} (must be 0-99)")]
    Volume(u8),

    /// Payload longer than the one-byte length field can express.
    #[error("command data too long: {0} bytes (max 255)")]
    DataTooLong(usize),

    /// Source name not present in the source table.
    #[error("unknown source \"{name}\", available: {available}")]
    UnknownSource { name: String, available: String },
}
