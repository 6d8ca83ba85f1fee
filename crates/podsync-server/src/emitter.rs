//! Room-scoped event fan-out.
//!
//! Delivery policy:
//! - An update goes to the current members of its resource room only.
//! - Best effort, at most once per member; a member whose channel is gone
//!   or whose outbound queue is full is logged and skipped.
//! - Emitting never fails the caller.
//!
//! Members and their senders are snapshotted before anything is sent, so
//! joins and leaves can proceed while a broadcast is in flight.

use podsync_core::{ConnectionId, ServerEvent, ServerMessage};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::types::{ConnectionTable, OutboundTx, SharedRooms};

/// Publishes update events to room members.
#[derive(Clone)]
pub struct EventEmitter {
    clients: ConnectionTable,
    rooms: SharedRooms,
}

impl EventEmitter {
    pub fn new(clients: ConnectionTable, rooms: SharedRooms) -> Self {
        EventEmitter { clients, rooms }
    }

    /// Broadcast `event` to its room.
    ///
    /// Returns how many connections the event was handed to.
    pub async fn emit(&self, event: ServerEvent) -> usize {
        let room = event.room();

        let members = {
            let guard = self.rooms.read().await;
            guard.members(&room)
        };

        if members.is_empty() {
            debug!(%room, event = event.name(), "no subscribers for update");
            return 0;
        }

        let recipients: Vec<(ConnectionId, OutboundTx)> = {
            let guard = self.clients.read().await;
            members
                .iter()
                .filter_map(|id| guard.get(id).map(|tx| (*id, tx.clone())))
                .collect()
        };

        let name = event.name();
        let msg = ServerMessage::Update(event);
        let mut delivered = 0;

        for (conn_id, tx) in recipients {
            match tx.try_send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%conn_id, %room, "outbound queue full; update dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(%conn_id, %room, "connection closed before update could be queued");
                }
            }
        }

        debug!(%room, event = name, recipients = delivered, "broadcast update");
        delivered
    }

    /// Emit `event` only if `committed` is `Ok`, then hand the result back.
    pub async fn emit_after_commit<T, E>(
        &self,
        committed: Result<T, E>,
        event: ServerEvent,
    ) -> Result<T, E> {
        if committed.is_ok() {
            self.emit(event).await;
        } else {
            debug!(room = %event.room(), "commit failed; update not broadcast");
        }
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use podsync_core::{PodStatus, RoomId, RoomRegistry};
    use tokio::sync::{mpsc, RwLock};

    use crate::types::OutboundRx;

    fn setup() -> (EventEmitter, ConnectionTable, SharedRooms) {
        let clients: ConnectionTable = Arc::new(RwLock::new(HashMap::new()));
        let rooms: SharedRooms = Arc::new(RwLock::new(RoomRegistry::new()));
        (EventEmitter::new(clients.clone(), rooms.clone()), clients, rooms)
    }

    async fn connect(clients: &ConnectionTable, id: u64) -> OutboundRx {
        connect_with_queue(clients, id, 8).await
    }

    async fn connect_with_queue(clients: &ConnectionTable, id: u64, queue: usize) -> OutboundRx {
        let (tx, rx) = mpsc::channel(queue);
        clients.write().await.insert(ConnectionId(id), tx);
        rx
    }

    #[tokio::test]
    async fn emit_reaches_members_only() {
        let (emitter, clients, rooms) = setup();
        let mut member = connect(&clients, 1).await;
        let mut stranger = connect(&clients, 2).await;
        rooms.write().await.join(ConnectionId(1), RoomId::pod("p1").unwrap());

        let delivered = emitter.emit(ServerEvent::pod("p1", PodStatus::Occupied)).await;

        assert_eq!(delivered, 1);
        assert_eq!(
            member.try_recv().unwrap(),
            ServerMessage::Update(ServerEvent::pod("p1", PodStatus::Occupied))
        );
        assert!(stranger.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_member_is_skipped() {
        let (emitter, clients, rooms) = setup();
        let gone = connect(&clients, 1).await;
        let mut alive = connect(&clients, 2).await;
        {
            let mut guard = rooms.write().await;
            guard.join(ConnectionId(1), RoomId::pod("p1").unwrap());
            guard.join(ConnectionId(2), RoomId::pod("p1").unwrap());
        }
        drop(gone);

        let delivered = emitter.emit(ServerEvent::pod("p1", PodStatus::Available)).await;

        assert_eq!(delivered, 1);
        assert!(alive.try_recv().is_ok());
    }

    #[tokio::test]
    async fn full_queue_drops_the_update_for_that_member_only() {
        let (emitter, clients, rooms) = setup();
        let mut stalled = connect_with_queue(&clients, 1, 1).await;
        let mut reading = connect(&clients, 2).await;
        {
            let mut guard = rooms.write().await;
            guard.join(ConnectionId(1), RoomId::pod("p1").unwrap());
            guard.join(ConnectionId(2), RoomId::pod("p1").unwrap());
        }

        assert_eq!(emitter.emit(ServerEvent::pod("p1", PodStatus::Reserved)).await, 2);
        assert_eq!(emitter.emit(ServerEvent::pod("p1", PodStatus::Occupied)).await, 1);

        assert_eq!(
            stalled.try_recv().unwrap(),
            ServerMessage::Update(ServerEvent::pod("p1", PodStatus::Reserved))
        );
        assert!(stalled.try_recv().is_err());
        assert!(reading.try_recv().is_ok());
        assert_eq!(
            reading.try_recv().unwrap(),
            ServerMessage::Update(ServerEvent::pod("p1", PodStatus::Occupied))
        );
    }

    #[tokio::test]
    async fn failed_commit_is_not_broadcast() {
        let (emitter, clients, rooms) = setup();
        let mut member = connect(&clients, 1).await;
        rooms.write().await.join(ConnectionId(1), RoomId::pod("p1").unwrap());

        let result: Result<(), &str> = emitter
            .emit_after_commit(Err("write conflict"), ServerEvent::pod("p1", PodStatus::Occupied))
            .await;
        assert_eq!(result, Err("write conflict"));
        assert!(member.try_recv().is_err());

        let result: Result<u8, &str> = emitter
            .emit_after_commit(Ok(7), ServerEvent::pod("p1", PodStatus::Occupied))
            .await;
        assert_eq!(result, Ok(7));
        assert!(member.try_recv().is_ok());
    }
}
