//! Room subscriptions on the client side.
//!
//! Any number of [`Subscription`]s may watch the same room. The hub sends
//! one `join` when the first of them is created and one `leave` when the
//! last of them is dropped, so a view that mounts and unmounts repeatedly
//! never accumulates listeners or server-side memberships.
//!
//! The connection task feeds every decoded server message into
//! [`SubscriptionHub::dispatch`], which routes it to the subscriptions of
//! the room it concerns.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use podsync_core::{ClientMessage, RoomId, ServerEvent, ServerMessage};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::error::ClientError;

/// What a subscription observes for its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// The server confirmed membership (also replayed after a reconnect).
    Joined,
    Update(ServerEvent),
    Rejected { reason: String },
}

struct Listener {
    id: u64,
    tx: UnboundedSender<RoomEvent>,
}

#[derive(Default)]
struct RoomState {
    listeners: Vec<Listener>,
    confirmed: bool,
    rejected: Option<String>,
}

impl RoomState {
    fn deliver(&self, event: &RoomEvent) {
        for listener in &self.listeners {
            let _ = listener.tx.send(event.clone());
        }
    }
}

pub struct SubscriptionHub {
    rooms: DashMap<RoomId, RoomState>,
    outbound: UnboundedSender<ClientMessage>,
    next_id: AtomicU64,
}

impl SubscriptionHub {
    /// `outbound` carries the join/leave requests to the connection task.
    pub fn new(outbound: UnboundedSender<ClientMessage>) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            outbound,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn subscribe(self: &Arc<Self>, room: RoomId) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut state = self.rooms.entry(room.clone()).or_default();
            if state.listeners.is_empty() {
                debug!(%room, "first listener, joining");
                let _ = self.outbound.send(ClientMessage::Join(room.clone()));
            } else if state.confirmed {
                let _ = tx.send(RoomEvent::Joined);
            } else if let Some(reason) = &state.rejected {
                let _ = tx.send(RoomEvent::Rejected {
                    reason: reason.clone(),
                });
            }
            state.listeners.push(Listener { id, tx });
        }

        Subscription {
            room,
            id,
            rx,
            pending: VecDeque::new(),
            hub: Arc::clone(self),
        }
    }

    fn unsubscribe(&self, room: &RoomId, id: u64) {
        if let Entry::Occupied(mut entry) = self.rooms.entry(room.clone()) {
            entry.get_mut().listeners.retain(|l| l.id != id);
            if entry.get().listeners.is_empty() {
                entry.remove();
                debug!(%room, "last listener gone, leaving");
                let _ = self.outbound.send(ClientMessage::Leave(room.clone()));
            }
        }
    }

    /// Route one server message to the subscriptions it concerns.
    pub fn dispatch(&self, msg: ServerMessage) {
        match msg {
            ServerMessage::Update(event) => {
                let room = event.room();
                match self.rooms.get(&room) {
                    Some(state) => state.deliver(&RoomEvent::Update(event)),
                    None => debug!(%room, "update for a room with no listeners"),
                }
            }
            ServerMessage::Joined(room) => {
                if let Some(mut state) = self.rooms.get_mut(&room) {
                    // A queued join can race the re-join after a reconnect;
                    // listeners see one Joined per membership.
                    if state.confirmed {
                        debug!(%room, "duplicate join ack");
                        return;
                    }
                    state.confirmed = true;
                    state.rejected = None;
                    state.deliver(&RoomEvent::Joined);
                }
            }
            ServerMessage::JoinRejected(rejected) => {
                warn!(room = %rejected.room, reason = %rejected.reason, "join rejected");
                if let Some(mut state) = self.rooms.get_mut(&rejected.room) {
                    state.confirmed = false;
                    state.rejected = Some(rejected.reason.clone());
                    state.deliver(&RoomEvent::Rejected {
                        reason: rejected.reason,
                    });
                }
            }
            ServerMessage::Left(room) => debug!(%room, "left"),
            ServerMessage::Error(message) => warn!(%message, "server reported an error"),
            ServerMessage::Pong => {}
        }
    }

    /// Rooms with at least one live subscription.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.rooms.iter().map(|e| e.key().clone()).collect();
        rooms.sort();
        rooms
    }

    /// Memberships die with the connection; they are confirmed again by
    /// the `joined` acks after the re-join.
    pub fn connection_lost(&self) {
        for mut state in self.rooms.iter_mut() {
            state.confirmed = false;
            state.rejected = None;
        }
    }

    pub fn listener_count(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map_or(0, |s| s.listeners.len())
    }
}

/// A live view of one room. Dropping it releases the listener.
pub struct Subscription {
    room: RoomId,
    id: u64,
    rx: UnboundedReceiver<RoomEvent>,
    pending: VecDeque<RoomEvent>,
    hub: Arc<SubscriptionHub>,
}

impl Subscription {
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub async fn recv(&mut self) -> Option<RoomEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RoomEvent> {
        self.pending.pop_front().or_else(|| self.rx.try_recv().ok())
    }

    /// Wait for the next `Joined` for this room. Updates that arrive in
    /// the meantime stay queued for [`recv`](Self::recv).
    pub async fn joined(&mut self) -> Result<(), ClientError> {
        loop {
            match self.rx.recv().await {
                Some(RoomEvent::Joined) => return Ok(()),
                Some(RoomEvent::Rejected { reason }) => {
                    return Err(ClientError::JoinRejected {
                        room: self.room.clone(),
                        reason,
                    })
                }
                Some(other) => self.pending.push_back(other),
                None => return Err(ClientError::Closed),
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(&self.room, self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("room", &self.room)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsync_core::{BookingStatus, PodStatus};

    fn hub() -> (Arc<SubscriptionHub>, UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SubscriptionHub::new(tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<ClientMessage>) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn one_join_and_one_leave_per_room() {
        let (hub, mut outbound) = hub();
        let p1 = RoomId::pod("p1").unwrap();

        let a = hub.subscribe(p1.clone());
        let b = hub.subscribe(p1.clone());
        assert_eq!(drain(&mut outbound), vec![ClientMessage::Join(p1.clone())]);

        drop(a);
        assert!(drain(&mut outbound).is_empty());
        assert_eq!(hub.listener_count(&p1), 1);

        drop(b);
        assert_eq!(drain(&mut outbound), vec![ClientMessage::Leave(p1.clone())]);
        assert_eq!(hub.listener_count(&p1), 0);
        assert!(hub.active_rooms().is_empty());
    }

    #[test]
    fn remounting_does_not_accumulate_listeners() {
        let (hub, mut outbound) = hub();
        let b1 = RoomId::booking("b1").unwrap();

        for _ in 0..5 {
            let sub = hub.subscribe(b1.clone());
            assert_eq!(hub.listener_count(&b1), 1);
            drop(sub);
        }

        let sent = drain(&mut outbound);
        assert_eq!(sent.len(), 10);
        assert_eq!(sent.last(), Some(&ClientMessage::Leave(b1.clone())));
        assert_eq!(hub.listener_count(&b1), 0);
    }

    #[test]
    fn updates_reach_only_their_room() {
        let (hub, _outbound) = hub();
        let mut b1 = hub.subscribe(RoomId::booking("b1").unwrap());
        let mut b2 = hub.subscribe(RoomId::booking("b2").unwrap());

        let event = ServerEvent::booking("b1", BookingStatus::Confirmed);
        hub.dispatch(ServerMessage::Update(event.clone()));

        assert_eq!(b1.try_recv(), Some(RoomEvent::Update(event)));
        assert_eq!(b2.try_recv(), None);
    }

    #[test]
    fn late_subscriber_sees_existing_confirmation() {
        let (hub, _outbound) = hub();
        let p1 = RoomId::pod("p1").unwrap();

        let mut first = hub.subscribe(p1.clone());
        hub.dispatch(ServerMessage::Joined(p1.clone()));
        assert_eq!(first.try_recv(), Some(RoomEvent::Joined));

        let mut second = hub.subscribe(p1.clone());
        assert_eq!(second.try_recv(), Some(RoomEvent::Joined));

        hub.connection_lost();
        let mut third = hub.subscribe(p1);
        assert_eq!(third.try_recv(), None);
    }

    #[test]
    fn rejection_is_delivered() {
        let (hub, _outbound) = hub();
        let b1 = RoomId::booking("b1").unwrap();
        let mut sub = hub.subscribe(b1.clone());

        hub.dispatch(ServerMessage::join_rejected(b1, "closed"));
        assert_eq!(
            sub.try_recv(),
            Some(RoomEvent::Rejected {
                reason: "closed".into()
            })
        );
    }

    #[tokio::test]
    async fn late_subscriber_learns_of_an_earlier_rejection() {
        let (hub, mut outbound) = hub();
        let b1 = RoomId::booking("b1").unwrap();

        let mut first = hub.subscribe(b1.clone());
        hub.dispatch(ServerMessage::join_rejected(b1.clone(), "closed"));
        assert!(first.joined().await.is_err());
        drain(&mut outbound);

        let mut second = hub.subscribe(b1.clone());
        assert!(drain(&mut outbound).is_empty());
        let err = tokio::time::timeout(std::time::Duration::from_secs(1), second.joined())
            .await
            .expect("second subscriber got no join outcome")
            .unwrap_err();
        assert!(matches!(err, ClientError::JoinRejected { reason, .. } if reason == "closed"));

        hub.connection_lost();
        let mut third = hub.subscribe(b1);
        assert_eq!(third.try_recv(), None);
    }

    #[test]
    fn repeated_join_ack_is_delivered_once() {
        let (hub, _outbound) = hub();
        let p1 = RoomId::pod("p1").unwrap();
        let mut sub = hub.subscribe(p1.clone());

        hub.dispatch(ServerMessage::Joined(p1.clone()));
        hub.dispatch(ServerMessage::Joined(p1.clone()));
        assert_eq!(sub.try_recv(), Some(RoomEvent::Joined));
        assert_eq!(sub.try_recv(), None);

        hub.connection_lost();
        hub.dispatch(ServerMessage::Joined(p1));
        assert_eq!(sub.try_recv(), Some(RoomEvent::Joined));
    }

    #[tokio::test]
    async fn joined_keeps_early_updates_queued() {
        let (hub, _outbound) = hub();
        let p1 = RoomId::pod("p1").unwrap();
        let mut sub = hub.subscribe(p1.clone());

        let event = ServerEvent::pod("p1", PodStatus::Reserved);
        hub.dispatch(ServerMessage::Update(event.clone()));
        hub.dispatch(ServerMessage::Joined(p1));

        sub.joined().await.unwrap();
        assert_eq!(sub.recv().await, Some(RoomEvent::Update(event)));
    }
}
