//! Client module: connection management for a single device.

pub mod connection;
pub mod device_info;

pub use connection::{BroadcastCallback, Connection, ConnectionState};
pub use device_info::DeviceInfo;
