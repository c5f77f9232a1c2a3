//! Codec for encoding and decoding protocol frames.
//!
//! Frame formats:
//! ```text
//! Command:  +------+------+------+------+--------------+------+
//!           | 0x21 | Zone | Op   | Len  |  Data (Len)  | 0x0D |
//!           +------+------+------+------+--------------+------+
//! Response: +------+------+------+--------+------+--------------+------+
//!           | 0x21 | Zone | Op   | Answer | Len  |  Data (Len)  | 0x0D |
//!           +------+------+------+--------+------+--------------+------+
//! ```
//!
//! Framing is length-prefixed, not delimiter-scanned: the length byte is
//! authoritative, and data bytes are never searched for the end sentinel.
//! Raw device state (for instance an ASCII version string containing 0x0D)
//! therefore cannot terminate a frame early. Readers must consume exactly
//! `Len` data bytes before checking for the end byte.

use bytes::{BufMut, Bytes, BytesMut};
use log::warn;

use crate::error::ProtocolError;
use crate::types::{
    AnswerCode, Command, Response, END_BYTE, MIN_RESPONSE_LEN, RESPONSE_HEADER_LEN, START_BYTE,
};

/// Encode a command into its wire frame. Infallible: validity was
/// established when the [`Command`] was constructed.
pub fn encode_command(command: &Command) -> Bytes {
    let mut frame = BytesMut::with_capacity(command.data().len() + 5);
    frame.put_u8(START_BYTE);
    frame.put_u8(command.zone());
    frame.put_u8(command.op());
    frame.put_u8(command.data().len() as u8);
    frame.put_slice(command.data());
    frame.put_u8(END_BYTE);
    frame.freeze()
}

/// Decode one complete response frame.
///
/// Validates framing only: sentinels and the declared length. Zone and op
/// values pass through unchecked, since broadcasts may carry codes this
/// crate does not enumerate.
pub fn decode_response(frame: &[u8]) -> Result<Response, ProtocolError> {
    if frame.len() < MIN_RESPONSE_LEN {
        return Err(ProtocolError::FrameTooShort(frame.len()));
    }
    if frame[0] != START_BYTE {
        return Err(ProtocolError::InvalidStartByte(frame[0]));
    }
    if frame[frame.len() - 1] != END_BYTE {
        return Err(ProtocolError::InvalidEndByte(frame[frame.len() - 1]));
    }

    let data_len = frame[4] as usize;
    let expected = MIN_RESPONSE_LEN + data_len;
    if frame.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            expected,
            actual: frame.len(),
        });
    }

    Ok(Response {
        zone: frame[1],
        op: frame[2],
        answer: AnswerCode::from(frame[3]),
        data: frame[RESPONSE_HEADER_LEN..RESPONSE_HEADER_LEN + data_len].to_vec(),
    })
}

/// Check that a response answers the command that was sent.
///
/// A mismatch is logged and reported, never raised: the device may
/// interleave a broadcast with the same framing shape as a reply, so this
/// is a warning signal for the caller, not a hard failure.
pub fn validate_correlation(response: &Response, expected_op: u8) -> bool {
    if response.op != expected_op {
        warn!(
            "response op mismatch: expected 0x{:02X}, got 0x{:02X}",
            expected_op, response.op
        );
        return false;
    }
    true
}

/// Total response frame length for a header declaring `data_len` data bytes.
pub fn response_len(data_len: u8) -> usize {
    MIN_RESPONSE_LEN + data_len as usize
}
