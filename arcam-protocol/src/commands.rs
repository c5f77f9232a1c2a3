//! Command catalog: builders for every supported operation, and decoders
//! for their reply payloads.
//!
//! This is the single place where value ranges are enforced: zone (1-2) at
//! [`Command`] construction, volume (0-99) here. The decoders are total
//! over arbitrary payloads and report "no value" on a length mismatch
//! instead of failing, since a malformed status echo is not actionable.

use log::warn;

use crate::error::InvalidArgument;
use crate::source::Source;
use crate::types::{Command, STATUS_REQUEST};

/// Command codes understood by the device.
pub mod opcodes {
    /// Power control and status.
    pub const POWER: u8 = 0x00;
    /// Software version query.
    pub const SOFTWARE_VERSION: u8 = 0x04;
    /// RC5 infrared simulation.
    pub const RC5_SIMULATE: u8 = 0x08;
    /// Volume control and status.
    pub const VOLUME: u8 = 0x0D;
    /// Mute status.
    pub const MUTE: u8 = 0x0E;
    /// Source status.
    pub const SOURCE: u8 = 0x1D;
}

/// RC5 code pair toggling mute. The device has no direct mute set, only
/// the remote-control toggle.
pub const RC5_MUTE: [u8; 2] = [0x10, 0x0D];

/// Maximum direct volume value.
pub const MAX_VOLUME: u8 = 99;

/// Version reply payload length: fixed 12 ASCII bytes, NUL padded.
pub const VERSION_DATA_LEN: usize = 12;

/// Every operation the catalog can express.
///
/// A closed set: "send this, then refresh that" helpers match on kinds
/// instead of dispatching through factory functions and loose argument
/// lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    PowerOn,
    PowerOff,
    QueryPower,
    SetVolume { volume: u8 },
    QueryVolume,
    QueryMute,
    ToggleMute,
    QuerySource,
    SelectSource { source: Source },
    QueryVersion,
    Rc5 { data1: u8, data2: u8 },
}

impl CommandKind {
    /// Wire command code this kind is sent under.
    pub fn opcode(self) -> u8 {
        match self {
            CommandKind::PowerOn | CommandKind::PowerOff | CommandKind::QueryPower => {
                opcodes::POWER
            }
            CommandKind::SetVolume { .. } | CommandKind::QueryVolume => opcodes::VOLUME,
            CommandKind::QueryMute => opcodes::MUTE,
            CommandKind::QuerySource => opcodes::SOURCE,
            CommandKind::QueryVersion => opcodes::SOFTWARE_VERSION,
            CommandKind::ToggleMute
            | CommandKind::SelectSource { .. }
            | CommandKind::Rc5 { .. } => opcodes::RC5_SIMULATE,
        }
    }

    /// Build the wire command for `zone`.
    pub fn build(self, zone: u8) -> Result<Command, InvalidArgument> {
        let data = match self {
            CommandKind::PowerOn => vec![0x01],
            CommandKind::PowerOff => vec![0x00],
            CommandKind::SetVolume { volume } => {
                if volume > MAX_VOLUME {
                    return Err(InvalidArgument::Volume(volume));
                }
                vec![volume]
            }
            CommandKind::QueryPower
            | CommandKind::QueryVolume
            | CommandKind::QueryMute
            | CommandKind::QuerySource
            | CommandKind::QueryVersion => vec![STATUS_REQUEST],
            CommandKind::ToggleMute => RC5_MUTE.to_vec(),
            CommandKind::SelectSource { source } => source.rc5_code().to_vec(),
            CommandKind::Rc5 { data1, data2 } => vec![data1, data2],
        };
        Command::new(zone, self.opcode(), data)
    }
}

/// Build a source-selection command from a case-insensitive source name.
/// Unknown names fail with the list of valid ones.
pub fn select_source(zone: u8, name: &str) -> Result<Command, InvalidArgument> {
    let source = Source::resolve(name)?;
    CommandKind::SelectSource { source }.build(zone)
}

/// Decode a power status payload: one byte, 0x01 means on.
pub fn decode_power(data: &[u8]) -> Option<bool> {
    if data.len() != 1 {
        warn!("unexpected power status length: {}", data.len());
        return None;
    }
    Some(data[0] == 0x01)
}

/// Decode a volume status payload: one raw byte, 0-99 by contract.
pub fn decode_volume(data: &[u8]) -> Option<u8> {
    if data.len() != 1 {
        warn!("unexpected volume status length: {}", data.len());
        return None;
    }
    Some(data[0])
}

/// Decode a mute status payload: one byte, 0x01 means muted.
pub fn decode_mute(data: &[u8]) -> Option<bool> {
    if data.len() != 1 {
        warn!("unexpected mute status length: {}", data.len());
        return None;
    }
    Some(data[0] == 0x01)
}

/// Decode a source status payload through the static table. Unknown codes
/// yield no value.
pub fn decode_source(data: &[u8]) -> Option<Source> {
    if data.len() != 1 {
        warn!("unexpected source status length: {}", data.len());
        return None;
    }
    Source::from_status_code(data[0])
}

/// Decode a software version payload: exactly 12 ASCII bytes with trailing
/// NUL padding stripped. Non-ASCII content yields no value.
pub fn decode_version(data: &[u8]) -> Option<String> {
    if data.len() != VERSION_DATA_LEN {
        warn!("unexpected version payload length: {}", data.len());
        return None;
    }
    if !data.is_ascii() {
        warn!("version payload is not ASCII");
        return None;
    }
    let text = std::str::from_utf8(data).ok()?;
    Some(text.trim_end_matches('\0').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [CommandKind; 11] = [
        CommandKind::PowerOn,
        CommandKind::PowerOff,
        CommandKind::QueryPower,
        CommandKind::SetVolume { volume: 50 },
        CommandKind::QueryVolume,
        CommandKind::QueryMute,
        CommandKind::ToggleMute,
        CommandKind::QuerySource,
        CommandKind::SelectSource { source: Source::Cd },
        CommandKind::QueryVersion,
        CommandKind::Rc5 { data1: 0x10, data2: 0x0D },
    ];

    #[test]
    fn test_every_kind_rejects_invalid_zone() {
        for kind in ALL_KINDS {
            for zone in [0u8, 3] {
                assert_eq!(
                    kind.build(zone).unwrap_err(),
                    InvalidArgument::Zone(zone),
                    "kind {kind:?} accepted zone {zone}"
                );
            }
            assert!(kind.build(1).is_ok());
            assert!(kind.build(2).is_ok());
        }
    }

    #[test]
    fn test_power_commands() {
        let on = CommandKind::PowerOn.build(1).unwrap();
        assert_eq!(on.op(), opcodes::POWER);
        assert_eq!(on.data(), &[0x01]);

        let off = CommandKind::PowerOff.build(1).unwrap();
        assert_eq!(off.data(), &[0x00]);
    }

    #[test]
    fn test_queries_use_status_request_sentinel() {
        let queries = [
            (CommandKind::QueryPower, opcodes::POWER),
            (CommandKind::QueryVolume, opcodes::VOLUME),
            (CommandKind::QueryMute, opcodes::MUTE),
            (CommandKind::QuerySource, opcodes::SOURCE),
            (CommandKind::QueryVersion, opcodes::SOFTWARE_VERSION),
        ];
        for (kind, opcode) in queries {
            let command = kind.build(2).unwrap();
            assert_eq!(command.op(), opcode);
            assert_eq!(command.data(), &[STATUS_REQUEST]);
        }
    }

    #[test]
    fn test_set_volume_range() {
        let command = CommandKind::SetVolume { volume: 99 }.build(1).unwrap();
        assert_eq!(command.data(), &[99]);

        assert_eq!(
            CommandKind::SetVolume { volume: 100 }.build(1).unwrap_err(),
            InvalidArgument::Volume(100)
        );
    }

    #[test]
    fn test_toggle_mute_is_rc5() {
        let command = CommandKind::ToggleMute.build(1).unwrap();
        assert_eq!(command.op(), opcodes::RC5_SIMULATE);
        assert_eq!(command.data(), &RC5_MUTE);
    }

    #[test]
    fn test_select_source_case_insensitive() {
        let lower = select_source(1, "cd").unwrap();
        let upper = select_source(1, "CD").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.op(), opcodes::RC5_SIMULATE);
        assert_eq!(lower.data(), &[0x10, 0x76]);
    }

    #[test]
    fn test_select_source_unknown_name() {
        let err = select_source(1, "TAPE").unwrap_err();
        assert!(matches!(err, InvalidArgument::UnknownSource { .. }));
    }

    #[test]
    fn test_decoders_reject_wrong_lengths() {
        for data in [&[][..], &[0x01, 0x02][..]] {
            assert_eq!(decode_power(data), None);
            assert_eq!(decode_volume(data), None);
            assert_eq!(decode_mute(data), None);
            assert_eq!(decode_source(data), None);
            assert_eq!(decode_version(data), None);
        }
    }

    #[test]
    fn test_decode_power_and_mute() {
        assert_eq!(decode_power(&[0x01]), Some(true));
        assert_eq!(decode_power(&[0x00]), Some(false));
        // The device reports exactly 0x01 for "on"; anything else is off.
        assert_eq!(decode_power(&[0x02]), Some(false));
        assert_eq!(decode_mute(&[0x01]), Some(true));
        assert_eq!(decode_mute(&[0x00]), Some(false));
    }

    #[test]
    fn test_decode_volume() {
        assert_eq!(decode_volume(&[0]), Some(0));
        assert_eq!(decode_volume(&[42]), Some(42));
        assert_eq!(decode_volume(&[99]), Some(99));
    }

    #[test]
    fn test_decode_source() {
        assert_eq!(decode_source(&[0x00]), Some(Source::Cd));
        assert_eq!(decode_source(&[0x0E]), Some(Source::Uhd));
        assert_eq!(decode_source(&[0x7F]), None);
    }

    #[test]
    fn test_decode_version() {
        assert_eq!(
            decode_version(b"AVR450_2.01\0"),
            Some("AVR450_2.01".to_string())
        );
        assert_eq!(
            decode_version(b"V1.0\0\0\0\0\0\0\0\0"),
            Some("V1.0".to_string())
        );
        // Wrong length.
        assert_eq!(decode_version(b"AVR450_2.01"), None);
        // Non-ASCII content.
        assert_eq!(decode_version(&[0xFFu8; 12]), None);
    }
}
