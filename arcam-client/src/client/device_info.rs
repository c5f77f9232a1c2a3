//! Device information snapshot.

use log::warn;
use serde::{Deserialize, Serialize};

use arcam_protocol::{commands, CommandKind};

use crate::client::connection::Connection;

/// What we know about the device behind a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub host: String,
    pub port: u16,
    /// Reported software version, or "Unknown" when the query fails.
    pub version: String,
    pub connected: bool,
}

impl Connection {
    /// Query the device software version and report it together with the
    /// connection coordinates.
    ///
    /// Never fails: any error along the way, including not being
    /// connected, yields the "Unknown" placeholder instead.
    pub async fn get_device_info(&self) -> DeviceInfo {
        let command = CommandKind::QueryVersion
            .build(1)
            .expect("zone 1 is always valid");

        let version = match self.send_command(&command).await {
            Ok(response) if response.is_success() => commands::decode_version(&response.data),
            Ok(response) => {
                warn!(
                    "version query rejected: answer=0x{:02X}",
                    response.answer.code()
                );
                None
            }
            Err(err) => {
                warn!("version query failed: {}", err);
                None
            }
        };

        DeviceInfo {
            host: self.host().to_string(),
            port: self.port(),
            version: version.unwrap_or_else(|| "Unknown".to_string()),
            connected: self.is_connected(),
        }
    }
}
