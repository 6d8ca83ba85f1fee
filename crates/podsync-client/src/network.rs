// crates/podsync-client/src/network.rs

use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use podsync_core::{ClientMessage, ServerMessage};
use podsync_protocol::{json_codec, ProtocolError, MAX_FRAME_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::subscription::SubscriptionHub;
use crate::types::ClientConfig;

/// The client's single TCP connection.
///
/// Owns the socket, reconnects with exponential backoff when it drops,
/// and re-joins every room that still has subscribers once it is back.
pub struct SyncConnection {
    config: ClientConfig,
    stream: Option<TcpStream>,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    hub: Arc<SubscriptionHub>,
    reconnect_attempts: u32,
    last_seen: Instant,
}

impl SyncConnection {
    pub fn new(config: ClientConfig, hub: Arc<SubscriptionHub>) -> Self {
        Self {
            config,
            stream: None,
            read_buffer: BytesMut::with_capacity(MAX_FRAME_LEN),
            write_buffer: BytesMut::with_capacity(1024),
            hub,
            reconnect_attempts: 0,
            last_seen: Instant::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn connect(&mut self) -> Result<(), ClientError> {
        info!("Connecting to {}...", self.config.server_addr);

        match TcpStream::connect(&self.config.server_addr).await {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                self.stream = Some(stream);
                self.reconnect_attempts = 0;
                self.last_seen = Instant::now();
                info!("Connected successfully");
                Ok(())
            }
            Err(e) => {
                error!("Connection failed: {}", e);
                Err(e.into())
            }
        }
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        self.write_buffer.clear();
        self.write_buffer
            .extend_from_slice(json_codec::encode_client(msg)?.as_bytes());
        self.write_buffer.extend_from_slice(b"\n");

        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;

        debug!("Sent message: {:?}", msg);
        Ok(())
    }

    /// Drive the connection until `shutdown` is cancelled.
    ///
    /// `rx` carries requests from [`SyncClient`](crate::SyncClient) and
    /// the subscription hub. While disconnected they wait in the channel
    /// and go out after the re-join.
    pub async fn run(
        &mut self,
        mut rx: UnboundedReceiver<ClientMessage>,
        shutdown: CancellationToken,
    ) {
        let mut heartbeat = interval(self.config.heartbeat());
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;

        loop {
            if !self.is_connected() {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = self.reconnect() => {}
                }
                continue;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,

                _ = heartbeat.tick() => {
                    if self.last_seen.elapsed() > self.config.heartbeat() * 3 {
                        warn!("No traffic for three heartbeats");
                        self.handle_disconnect();
                    } else if let Err(e) = self.send(&ClientMessage::Ping).await {
                        warn!("Heartbeat failed: {}", e);
                        self.handle_disconnect();
                    }
                }

                msg = rx.recv() => match msg {
                    Some(msg) => {
                        if let Err(e) = self.send(&msg).await {
                            error!("Failed to send message: {}", e);
                            self.handle_disconnect();
                        }
                    }
                    None => {
                        info!("All senders dropped");
                        break;
                    }
                },

                result = self.read_message() => {
                    match result {
                        Ok(Some(msg)) => {
                            debug!("Received from server: {:?}", msg);
                            self.last_seen = Instant::now();
                            self.hub.dispatch(msg);
                        }
                        Ok(None) => {
                            info!("Server closed the connection");
                            self.handle_disconnect();
                        }
                        Err(e) => {
                            error!("Read error: {}", e);
                            self.handle_disconnect();
                        }
                    }
                }
            }
        }

        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        info!("Connection task stopped");
    }

    async fn read_message(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        loop {
            if let Some(pos) = self.read_buffer.iter().position(|&b| b == b'\n') {
                let frame = self.read_buffer.split_to(pos + 1);
                let line = String::from_utf8_lossy(&frame);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match json_codec::decode_server(line) {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(e) => {
                        warn!("Skipping undecodable frame: {}", e);
                        continue;
                    }
                }
            }

            if self.read_buffer.len() > MAX_FRAME_LEN {
                return Err(ProtocolError::FrameTooLong(self.read_buffer.len()).into());
            }

            // read_buf keeps partial frames in the buffer if this future is
            // dropped by the select in `run`.
            let n = stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Ok(None);
            }
        }
    }

    fn handle_disconnect(&mut self) {
        warn!("Connection lost");
        self.stream = None;
        self.read_buffer.clear();
        self.hub.connection_lost();
    }

    async fn reconnect(&mut self) {
        self.reconnect_attempts = self.reconnect_attempts.saturating_add(1);
        let delay = self.config.backoff(self.reconnect_attempts);
        info!(
            attempt = self.reconnect_attempts,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting"
        );
        sleep(delay).await;

        if self.connect().await.is_err() {
            return;
        }

        for room in self.hub.active_rooms() {
            debug!(%room, "re-joining");
            if let Err(e) = self.send(&ClientMessage::Join(room)).await {
                warn!("Re-join failed: {}", e);
                self.handle_disconnect();
                return;
            }
        }
        info!("Reconnected successfully");
    }
}
