//! Wire protocol definitions for Arcam AVR control.
//!
//! This crate defines the binary request/response protocol spoken by Arcam
//! AVR receivers on their TCP control port. It is pure data handling: no
//! sockets, no concurrency. The companion `arcam-client` crate owns the
//! connection.
//!
//! # Frame Format
//!
//! ```text
//! Command:  +------+------+------+------+--------------+------+
//!           | 0x21 | Zone | Op   | Len  |  Data (Len)  | 0x0D |
//!           +------+------+------+------+--------------+------+
//! Response: +------+------+------+--------+------+--------------+------+
//!           | 0x21 | Zone | Op   | Answer | Len  |  Data (Len)  | 0x0D |
//!           +------+------+------+--------+------+--------------+------+
//! ```
//!
//! # Example
//!
//! ```rust
//! use arcam_protocol::{decode_response, encode_command, CommandKind};
//!
//! // Build and encode a command.
//! let command = CommandKind::PowerOn.build(1).unwrap();
//! let frame = encode_command(&command);
//! assert_eq!(frame.as_ref(), &[0x21, 0x01, 0x00, 0x01, 0x01, 0x0D]);
//!
//! // Decode a reply.
//! let response = decode_response(&[0x21, 0x01, 0x00, 0x00, 0x01, 0x01, 0x0D]).unwrap();
//! assert!(response.is_success());
//! ```

pub mod codec;
pub mod commands;
pub mod error;
pub mod source;
pub mod types;

pub use codec::{decode_response, encode_command, response_len, validate_correlation};
pub use commands::{
    decode_mute, decode_power, decode_source, decode_version, decode_volume, select_source,
    CommandKind, MAX_VOLUME, RC5_MUTE, VERSION_DATA_LEN,
};
pub use error::{InvalidArgument, ProtocolError};
pub use source::Source;
pub use types::{
    AnswerCode, Command, Response, DEFAULT_PORT, END_BYTE, MAX_DATA_LEN, MIN_RESPONSE_LEN,
    RESPONSE_HEADER_LEN, START_BYTE, STATUS_REQUEST,
};
