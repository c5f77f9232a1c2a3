//! Core value types for the Arcam control protocol.

use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

/// Frame start sentinel, ASCII `!`.
pub const START_BYTE: u8 = 0x21;

/// Frame end sentinel, ASCII carriage return.
pub const END_BYTE: u8 = 0x0D;

/// TCP control port used by the device.
pub const DEFAULT_PORT: u16 = 50000;

/// Reserved payload byte meaning "report the current value" instead of
/// "assign this value". Status queries reuse the set opcode with this
/// sentinel as their whole payload.
pub const STATUS_REQUEST: u8 = 0xF0;

/// Response header length: start, zone, op, answer, data length.
pub const RESPONSE_HEADER_LEN: usize = 5;

/// Smallest possible response frame: header plus end byte, empty payload.
pub const MIN_RESPONSE_LEN: usize = 6;

/// Maximum payload length expressible in the one-byte length field.
pub const MAX_DATA_LEN: usize = 255;

/// A command addressed to one zone of the device.
///
/// Field validity is established here, at construction; encoding a
/// `Command` never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    zone: u8,
    op: u8,
    data: Vec<u8>,
}

impl Command {
    /// Build a command, validating zone and payload length. Out-of-range
    /// values are rejected, never truncated or clamped.
    pub fn new(zone: u8, op: u8, data: Vec<u8>) -> Result<Self, InvalidArgument> {
        if !(1..=2).contains(&zone) {
            return Err(InvalidArgument::Zone(zone));
        }
        if data.len() > MAX_DATA_LEN {
            return Err(InvalidArgument::DataTooLong(data.len()));
        }
        Ok(Self { zone, op, data })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn op(&self) -> u8 {
        self.op
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A reply, or an unsolicited broadcast, from the device. Produced only by
/// the decoder; the wire format does not distinguish the two cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub zone: u8,
    pub op: u8,
    pub answer: AnswerCode,
    pub data: Vec<u8>,
}

impl Response {
    /// True when the device accepted the command.
    pub fn is_success(&self) -> bool {
        self.answer == AnswerCode::Ok
    }
}

/// Status byte carried by every response.
///
/// The documented set is closed; anything else round-trips through
/// [`AnswerCode::Unknown`] with no reason string attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerCode {
    /// Command accepted.
    Ok,
    /// Zone number not valid for this device.
    ZoneInvalid,
    /// Command code not recognized.
    CommandNotRecognized,
    /// Parameter not recognized.
    ParameterNotRecognized,
    /// Command recognized but not valid in the current device state.
    InvalidAtThisTime,
    /// Declared data length rejected by the device.
    InvalidDataLength,
    /// Any status byte outside the documented set.
    Unknown(u8),
}

impl From<u8> for AnswerCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AnswerCode::Ok,
            0x82 => AnswerCode::ZoneInvalid,
            0x83 => AnswerCode::CommandNotRecognized,
            0x84 => AnswerCode::ParameterNotRecognized,
            0x85 => AnswerCode::InvalidAtThisTime,
            0x86 => AnswerCode::InvalidDataLength,
            other => AnswerCode::Unknown(other),
        }
    }
}

impl AnswerCode {
    /// The raw status byte.
    pub fn code(self) -> u8 {
        match self {
            AnswerCode::Ok => 0x00,
            AnswerCode::ZoneInvalid => 0x82,
            AnswerCode::CommandNotRecognized => 0x83,
            AnswerCode::ParameterNotRecognized => 0x84,
            AnswerCode::InvalidAtThisTime => 0x85,
            AnswerCode::InvalidDataLength => 0x86,
            AnswerCode::Unknown(code) => code,
        }
    }

    /// Returns true if this status byte indicates success.
    pub fn is_success(self) -> bool {
        self == AnswerCode::Ok
    }

    /// Human-readable reason for a documented failure. `None` for success
    /// and for unrecognized status bytes.
    pub fn description(self) -> Option<&'static str> {
        match self {
            AnswerCode::ZoneInvalid => Some("Invalid zone specified"),
            AnswerCode::CommandNotRecognized => Some("Command not recognized"),
            AnswerCode::ParameterNotRecognized => Some("Parameter not recognized"),
            AnswerCode::InvalidAtThisTime => Some("Command invalid at this time"),
            AnswerCode::InvalidDataLength => Some("Invalid data length"),
            AnswerCode::Ok | AnswerCode::Unknown(_) => None,
        }
    }
}
