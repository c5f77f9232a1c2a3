//! Static source-input table.
//!
//! Source selection has no direct opcode on this device: the wire protocol
//! only accepts the two-byte RC5 remote code for the input, sent through
//! the RC5-simulation command. Status replies, on the other hand, report
//! the current source as a single status-code byte. This module carries
//! both sides of that mapping as a fixed bidirectional table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

/// Every selectable input of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Cd,
    Bd,
    Av,
    Stb,
    Sat,
    Pvr,
    Vcr,
    Aux,
    Game,
    Net,
    Fm,
    Dab,
    Bt,
    Usb,
    Uhd,
}

impl Source {
    /// All sources, in status-code order.
    pub const ALL: [Source; 15] = [
        Source::Cd,
        Source::Bd,
        Source::Av,
        Source::Stb,
        Source::Sat,
        Source::Pvr,
        Source::Vcr,
        Source::Aux,
        Source::Game,
        Source::Net,
        Source::Fm,
        Source::Dab,
        Source::Bt,
        Source::Usb,
        Source::Uhd,
    ];

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Source::Cd => "CD",
            Source::Bd => "BD",
            Source::Av => "AV",
            Source::Stb => "STB",
            Source::Sat => "SAT",
            Source::Pvr => "PVR",
            Source::Vcr => "VCR",
            Source::Aux => "AUX",
            Source::Game => "GAME",
            Source::Net => "NET",
            Source::Fm => "FM",
            Source::Dab => "DAB",
            Source::Bt => "BT",
            Source::Usb => "USB",
            Source::Uhd => "UHD",
        }
    }

    /// Status-code byte the device reports for this source in SOURCE query
    /// replies.
    pub fn status_code(self) -> u8 {
        match self {
            Source::Cd => 0x00,
            Source::Bd => 0x01,
            Source::Av => 0x02,
            Source::Stb => 0x03,
            Source::Sat => 0x04,
            Source::Pvr => 0x05,
            Source::Vcr => 0x06,
            Source::Aux => 0x07,
            Source::Game => 0x08,
            Source::Net => 0x09,
            Source::Fm => 0x0A,
            Source::Dab => 0x0B,
            Source::Bt => 0x0C,
            Source::Usb => 0x0D,
            Source::Uhd => 0x0E,
        }
    }

    /// Source identified by a status-code byte, if documented.
    pub fn from_status_code(code: u8) -> Option<Source> {
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.status_code() == code)
    }

    /// RC5 code pair used to *select* this source.
    ///
    /// VCR and AUX share a pair; the device still reports them with
    /// distinct status codes.
    pub fn rc5_code(self) -> [u8; 2] {
        match self {
            Source::Cd => [0x10, 0x76],
            Source::Bd => [0x10, 0x62],
            Source::Av => [0x10, 0x5E],
            Source::Stb => [0x10, 0x64],
            Source::Sat => [0x10, 0x1B],
            Source::Pvr => [0x10, 0x60],
            Source::Vcr | Source::Aux => [0x10, 0x63],
            Source::Game => [0x10, 0x61],
            Source::Net => [0x10, 0x5C],
            Source::Fm => [0x10, 0x1C],
            Source::Dab => [0x10, 0x48],
            Source::Bt => [0x10, 0x7A],
            Source::Usb => [0x10, 0x7B],
            Source::Uhd => [0x10, 0x7D],
        }
    }

    /// Resolve a case-insensitive source name.
    pub fn resolve(name: &str) -> Result<Source, InvalidArgument> {
        let upper = name.to_ascii_uppercase();
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.name() == upper)
            .ok_or_else(|| InvalidArgument::UnknownSource {
                name: name.to_string(),
                available: Source::available_names(),
            })
    }

    /// Valid names, sorted, comma separated.
    pub fn available_names() -> String {
        let mut names: Vec<&str> = Source::ALL.iter().map(|source| source.name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
