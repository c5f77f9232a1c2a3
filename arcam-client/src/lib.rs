//! Async TCP control client for Arcam AVR receivers.
//!
//! This crate owns the connection to one device: it serializes command
//! execution so only one command is ever in flight, listens for the
//! unsolicited broadcast frames the device pushes on the same socket, and
//! reconnects with exponential backoff after a connection loss. The wire
//! protocol itself lives in `arcam-protocol`.
//!
//! # Example
//!
//! ```no_run
//! use arcam_client::{Connection, ConnectionConfig};
//! use arcam_protocol::{decode_volume, CommandKind};
//!
//! # async fn run() -> Result<(), arcam_client::ClientError> {
//! let connection = Connection::new(ConnectionConfig::new("192.168.1.40"));
//! connection.connect().await?;
//!
//! let reply = connection
//!     .send_command(&CommandKind::QueryVolume.build(1)?)
//!     .await?;
//! if reply.is_success() {
//!     println!("volume: {:?}", decode_volume(&reply.data));
//! }
//!
//! connection.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

pub use client::{BroadcastCallback, Connection, ConnectionState, DeviceInfo};
pub use config::ConnectionConfig;
pub use error::ClientError;

pub use arcam_protocol as protocol;
