//! TCP connection management for a single Arcam device.
//!
//! One [`Connection`] owns one socket. Three logically concurrent concerns
//! share it: command execution, broadcast listening, and reconnection.
//!
//! The wire format carries no tag distinguishing a solicited reply from an
//! unsolicited broadcast, so "a command currently holds the reader" is the
//! only correlation signal: `send_command` keeps the shared reader locked
//! for its whole round trip, and every frame read outside that window is
//! handed to the broadcast callback. A broadcast landing in the instant
//! after a reply is read can be missed by one poll interval; broadcasts are
//! periodic status echoes, so the next one covers it. This is a limitation
//! of the device protocol, not something the client can correct.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use arcam_protocol::{codec, Command, ProtocolError, Response, RESPONSE_HEADER_LEN};

use crate::config::ConnectionConfig;
use crate::error::ClientError;

/// Callback invoked with every unsolicited frame.
pub type BroadcastCallback = Box<dyn Fn(Response) -> BoxFuture<'static, ()> + Send + Sync>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Backing off before reconnect attempt N.
    Reconnecting(u32),
    /// Reconnect budget exhausted; waiting for an explicit `connect()`.
    GivenUp,
}

struct Shared {
    config: ConnectionConfig,
    state: Mutex<ConnectionState>,
    /// Serializes command execution: held for the full
    /// encode-write-read-decode cycle, so at most one command is in flight.
    command_lock: tokio::sync::Mutex<()>,
    /// Read half of the socket. `send_command` and the broadcast listener
    /// take turns on this lock; whoever holds it owns the next frame.
    reader: tokio::sync::Mutex<Option<OwnedReadHalf>>,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    /// The single broadcast subscriber slot.
    callback: Mutex<Option<Arc<BroadcastCallback>>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
}

/// Manages the TCP connection to one device.
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Create a new, disconnected connection.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(ConnectionState::Disconnected),
                command_lock: tokio::sync::Mutex::new(()),
                reader: tokio::sync::Mutex::new(None),
                writer: tokio::sync::Mutex::new(None),
                callback: Mutex::new(None),
                listener_task: Mutex::new(None),
                reconnect_task: Mutex::new(None),
            }),
        }
    }

    pub fn host(&self) -> &str {
        &self.shared.config.host
    }

    pub fn port(&self) -> u16 {
        self.shared.config.port
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Establish the connection. A no-op while already connected.
    pub async fn connect(&self) -> Result<(), ClientError> {
        if self.is_connected() {
            return Ok(());
        }
        establish(&self.shared).await
    }

    /// Tear the connection down: cancel reconnection and the broadcast
    /// listener (waiting for both), then close the socket. Close errors
    /// are swallowed; shutdown must not fail.
    pub async fn disconnect(&self) {
        debug!("disconnecting from {}", self.shared.config.host);

        // Cancel reconnection first so it cannot re-establish mid-teardown.
        let reconnect = self.shared.reconnect_task.lock().take();
        if let Some(handle) = reconnect {
            handle.abort();
            let _ = handle.await;
        }

        self.stop_listener_task().await;
        *self.shared.callback.lock() = None;

        if let Some(mut writer) = self.shared.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        self.shared.reader.lock().await.take();

        *self.shared.state.lock() = ConnectionState::Disconnected;
        info!(
            "disconnected from {}:{}",
            self.shared.config.host, self.shared.config.port
        );
    }

    /// Send one command and wait for its reply.
    ///
    /// Strictly serialized: concurrent callers queue on the command lock.
    /// Any I/O failure or timeout here schedules background reconnection
    /// and returns the error without waiting for it. A decodable reply
    /// with a mismatched op code is logged and still returned; the caller
    /// sees exactly what the device sent.
    pub async fn send_command(&self, command: &Command) -> Result<Response, ClientError> {
        let shared = &self.shared;
        let _in_flight = shared.command_lock.lock().await;

        if *shared.state.lock() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }

        let frame = codec::encode_command(command);
        debug!(
            "sending command: zone={}, op=0x{:02X}, data={:02X?}",
            command.zone(),
            command.op(),
            command.data()
        );

        // Take the reader for the whole round trip so the listener cannot
        // consume the reply.
        let mut reader_guard = shared.reader.lock().await;

        {
            let mut writer_guard = shared.writer.lock().await;
            let writer = writer_guard.as_mut().ok_or(ClientError::NotConnected)?;
            if let Err(err) = writer.write_all(&frame).await {
                error!("write failed: {}", err);
                drop(writer_guard);
                drop(reader_guard);
                connection_lost(shared);
                return Err(ClientError::ConnectionFailed(format!("write failed: {err}")));
            }
        }

        let reader = reader_guard.as_mut().ok_or(ClientError::NotConnected)?;
        let raw = match tokio::time::timeout(shared.config.timeout, read_frame(reader)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(FrameReadError::Protocol(err))) => {
                // Surfaced as-is; reconnection is driven only by I/O errors
                // and timeouts.
                return Err(ClientError::Protocol(err));
            }
            Ok(Err(FrameReadError::Io(err))) => {
                error!("read failed during command: {}", err);
                drop(reader_guard);
                connection_lost(shared);
                return Err(ClientError::ConnectionFailed(format!("read failed: {err}")));
            }
            Err(_) => {
                warn!("command timed out after {:?}", shared.config.timeout);
                drop(reader_guard);
                connection_lost(shared);
                return Err(ClientError::Timeout);
            }
        };
        drop(reader_guard);

        let response = codec::decode_response(&raw)?;
        codec::validate_correlation(&response, command.op());
        debug!(
            "received response: zone={}, op=0x{:02X}, answer=0x{:02X}, data={:02X?}",
            response.zone,
            response.op,
            response.answer.code(),
            response.data
        );
        Ok(response)
    }

    /// Register `callback` and start the broadcast listener. A listener
    /// that is already running is stopped first; there is at most one.
    pub async fn start_broadcast_listener(&self, callback: BroadcastCallback) {
        self.stop_listener_task().await;
        *self.shared.callback.lock() = Some(Arc::new(callback));
        spawn_listener(&self.shared);
        debug!("broadcast listener started");
    }

    /// Stop the broadcast listener and clear the callback slot.
    pub async fn stop_broadcast_listener(&self) {
        self.stop_listener_task().await;
        *self.shared.callback.lock() = None;
        debug!("broadcast listener stopped");
    }

    async fn stop_listener_task(&self) {
        let handle = self.shared.listener_task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // No async teardown in drop; abort the background tasks so nothing
        // keeps touching the socket.
        if let Some(handle) = self.shared.reconnect_task.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.shared.listener_task.lock().take() {
            handle.abort();
        }
    }
}

/// Open the socket and flip the state to `Connected`.
async fn establish(shared: &Arc<Shared>) -> Result<(), ClientError> {
    let host = &shared.config.host;
    let port = shared.config.port;
    debug!("connecting to {}:{}", host, port);

    let stream = tokio::time::timeout(
        shared.config.timeout,
        TcpStream::connect((host.as_str(), port)),
    )
    .await
    .map_err(|_| ClientError::ConnectionFailed(format!("connection timeout to {host}:{port}")))?
    .map_err(|err| {
        ClientError::ConnectionFailed(format!("connection failed to {host}:{port}: {err}"))
    })?;

    if let Err(err) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", err);
    }

    let (read_half, write_half) = stream.into_split();
    *shared.reader.lock().await = Some(read_half);
    *shared.writer.lock().await = Some(write_half);
    *shared.state.lock() = ConnectionState::Connected;

    info!("connected to {}:{}", host, port);
    Ok(())
}

/// Flag the link as lost and kick off background reconnection. A second
/// trigger while reconnection is already running is a no-op.
fn connection_lost(shared: &Arc<Shared>) {
    {
        let mut state = shared.state.lock();
        if *state != ConnectionState::Connected {
            return;
        }
        *state = ConnectionState::Reconnecting(1);
    }
    warn!(
        "connection to {} lost, scheduling reconnect",
        shared.config.host
    );

    let mut task = shared.reconnect_task.lock();
    if let Some(handle) = task.as_ref() {
        if !handle.is_finished() {
            return;
        }
    }
    let shared = Arc::clone(shared);
    *task = Some(tokio::spawn(reconnect_with_backoff(shared)));
}

/// Backoff before reconnect attempt `attempt` (1-based): base * 2^(n-1).
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.checked_mul(factor).unwrap_or(Duration::MAX)
}

async fn reconnect_with_backoff(shared: Arc<Shared>) {
    let max = shared.config.max_reconnect_attempts;
    let mut attempt = 0u32;

    while attempt < max {
        attempt += 1;
        *shared.state.lock() = ConnectionState::Reconnecting(attempt);

        let delay = backoff_delay(shared.config.reconnect_delay_base, attempt);
        info!("reconnect attempt {}/{} in {:?}", attempt, max, delay);
        tokio::time::sleep(delay).await;

        // An explicit connect() or disconnect() while we slept wins.
        match *shared.state.lock() {
            ConnectionState::Connected | ConnectionState::Disconnected => {
                debug!("reconnect superseded");
                return;
            }
            _ => {}
        }

        match establish(&shared).await {
            Ok(()) => {
                info!(
                    "reconnected to {}:{}",
                    shared.config.host, shared.config.port
                );
                // Commands that failed during the outage stay failed; only
                // the listener is restored, and only if someone subscribed.
                if shared.callback.lock().is_some() {
                    spawn_listener(&shared);
                }
                return;
            }
            Err(err) => warn!("reconnect attempt {} failed: {}", attempt, err),
        }
    }

    error!(
        "giving up on {} after {} reconnect attempts",
        shared.config.host, max
    );
    *shared.state.lock() = ConnectionState::GivenUp;
}

fn spawn_listener(shared: &Arc<Shared>) {
    let mut task = shared.listener_task.lock();
    if let Some(handle) = task.take() {
        handle.abort();
    }
    *task = Some(tokio::spawn(broadcast_loop(Arc::clone(shared))));
}

async fn broadcast_loop(shared: Arc<Shared>) {
    debug!("broadcast listener running");

    loop {
        if *shared.state.lock() != ConnectionState::Connected {
            break;
        }

        let mut reader_guard = shared.reader.lock().await;
        let Some(reader) = reader_guard.as_mut() else {
            break;
        };

        // Short poll for the first byte keeps the reader lock mostly free
        // for send_command; a frame is only committed to once a byte shows
        // up.
        let mut first = [0u8; 1];
        let poll = shared.config.broadcast_poll_interval;
        match tokio::time::timeout(poll, reader.read(&mut first)).await {
            // Nothing to report, keep listening.
            Err(_) => continue,
            Ok(Ok(0)) => {
                info!("connection closed by device");
                drop(reader_guard);
                connection_lost(&shared);
                break;
            }
            Ok(Ok(_)) => {
                let rest =
                    tokio::time::timeout(shared.config.timeout, read_frame_after(reader, first[0]))
                        .await;
                drop(reader_guard);
                match rest {
                    Ok(Ok(raw)) => match codec::decode_response(&raw) {
                        Ok(response) => {
                            debug!(
                                "broadcast: zone={}, op=0x{:02X}, answer=0x{:02X}",
                                response.zone,
                                response.op,
                                response.answer.code()
                            );
                            let callback = shared.callback.lock().clone();
                            if let Some(callback) = callback {
                                (*callback)(response).await;
                            }
                        }
                        // One undecodable frame is not a reason to stop
                        // listening.
                        Err(err) => debug!("dropping undecodable broadcast frame: {}", err),
                    },
                    Ok(Err(FrameReadError::Protocol(err))) => {
                        // EOF mid-frame: the peer is gone.
                        warn!("broadcast frame truncated: {}", err);
                        connection_lost(&shared);
                        break;
                    }
                    Ok(Err(FrameReadError::Io(err))) => {
                        warn!("broadcast read failed: {}", err);
                        connection_lost(&shared);
                        break;
                    }
                    Err(_) => {
                        warn!("device stalled mid-frame");
                        connection_lost(&shared);
                        break;
                    }
                }
            }
            Ok(Err(err)) => {
                warn!("broadcast read failed: {}", err);
                drop(reader_guard);
                connection_lost(&shared);
                break;
            }
        }
    }

    debug!("broadcast listener exiting");
}

enum FrameReadError {
    Io(io::Error),
    Protocol(ProtocolError),
}

/// Fill `buf` completely, reporting a short read if the peer closes first.
async fn read_full(reader: &mut OwnedReadHalf, buf: &mut [u8]) -> Result<(), FrameReadError> {
    let expected = buf.len();
    let mut filled = 0;
    while filled < expected {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => {
                return Err(FrameReadError::Protocol(ProtocolError::ShortRead {
                    expected,
                    actual: filled,
                }))
            }
            Ok(n) => filled += n,
            Err(err) => return Err(FrameReadError::Io(err)),
        }
    }
    Ok(())
}

/// Read one complete frame: the fixed five-byte header, then the declared
/// data length plus the end byte. Frames are variable length with no
/// out-of-band negotiation, so the read has to happen in these two phases.
async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Bytes, FrameReadError> {
    let mut header = [0u8; RESPONSE_HEADER_LEN];
    read_full(reader, &mut header).await?;
    read_body(reader, header).await
}

/// As [`read_frame`], with the first header byte already consumed.
async fn read_frame_after(reader: &mut OwnedReadHalf, first: u8) -> Result<Bytes, FrameReadError> {
    let mut header = [0u8; RESPONSE_HEADER_LEN];
    header[0] = first;
    read_full(reader, &mut header[1..]).await?;
    read_body(reader, header).await
}

async fn read_body(
    reader: &mut OwnedReadHalf,
    header: [u8; RESPONSE_HEADER_LEN],
) -> Result<Bytes, FrameReadError> {
    let total = codec::response_len(header[RESPONSE_HEADER_LEN - 1]);
    let mut frame = BytesMut::with_capacity(total);
    frame.extend_from_slice(&header);
    frame.resize(total, 0);
    read_full(reader, &mut frame[RESPONSE_HEADER_LEN..]).await?;
    Ok(frame.freeze())
}
