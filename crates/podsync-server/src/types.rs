//! Shared types for the podsync TCP server.
//!
//! This module defines:
//! - channel aliases between the server and each connection's writer
//! - `ConnectionTable`: connected clients and their outbound channels
//! - `SharedRooms`: the room registry behind the server's lock

use std::collections::HashMap;
use std::sync::Arc;

use podsync_core::{ConnectionId, RoomRegistry, ServerMessage};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Outbound messages from the server to a given connection.
///
/// Bounded by `Config::outbound_queue`; broadcasts to a full queue are
/// dropped.
pub type OutboundTx = mpsc::Sender<ServerMessage>;
pub type OutboundRx = mpsc::Receiver<ServerMessage>;

/// Registry of connected clients and their outbound channels.
///
/// - Key: `ConnectionId`
/// - Value: `OutboundTx` feeding that connection's writer task.
pub type ConnectionTable = Arc<RwLock<HashMap<ConnectionId, OutboundTx>>>;

/// Room membership, shared between connection tasks and the emitter.
///
/// Only connection lifecycle code (join / leave / disconnect) takes the
/// write lock; broadcasting reads a snapshot.
pub type SharedRooms = Arc<RwLock<RoomRegistry>>;

/// Point-in-time counters for a running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerStats {
    /// Open connections.
    pub connections: usize,
    /// Rooms with at least one member.
    pub rooms: usize,
}
