//! Message types exchanged over a live-sync connection.
//!
//! These are **transport-agnostic** logical messages:
//! - [`ClientMessage`]: what a connection sends to the server.
//! - [`ServerMessage`]: what the server sends back, including the
//!   room-scoped [`ServerEvent`] updates.
//!
//! Every update variant has a fixed payload shape; there are no
//! free-form event names. JSON / text encoders live in the
//! `podsync-protocol` crate; this module is purely logical.

use crate::resource::{ResourceKind, RoomId};
use crate::status::{BookingStatus, PodStatus};

/// A request from a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Subscribe to a room (`join-pod` / `join-booking`).
    Join(RoomId),

    /// Unsubscribe from a room (`leave-pod` / `leave-booking`).
    Leave(RoomId),

    /// Change a pod's status; broadcast once the change is committed.
    UpdatePod(PodUpdate),

    /// Change a booking's status; broadcast once the change is committed.
    UpdateBooking(BookingUpdate),

    /// Liveness probe, answered with [`ServerMessage::Pong`].
    Ping,
}

/// A room-scoped update event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `pod-update`: a pod's status changed.
    PodUpdate(PodUpdate),

    /// `booking-update`: a booking's status changed.
    BookingUpdate(BookingUpdate),
}

/// Pod status change payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodUpdate {
    pub pod_id: String,
    pub status: PodStatus,
}

/// Booking status change payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingUpdate {
    pub booking_id: String,
    pub status: BookingStatus,
}

/// A join refused by the server's authorization hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRejected {
    pub room: RoomId,
    pub reason: String,
}

/// Everything the server can send to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Room-scoped update, delivered only to room members.
    Update(ServerEvent),

    /// Acknowledgement of a processed join.
    Joined(RoomId),

    /// Acknowledgement of a processed leave.
    Left(RoomId),

    /// The join was refused; the connection is not a member.
    JoinRejected(JoinRejected),

    /// The previous frame could not be decoded or applied.
    Error(String),

    /// Reply to [`ClientMessage::Ping`].
    Pong,
}

impl ServerEvent {
    /// Kind of resource this event is about.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ServerEvent::PodUpdate(_) => ResourceKind::Pod,
            ServerEvent::BookingUpdate(_) => ResourceKind::Booking,
        }
    }

    /// Id of the resource this event is about.
    pub fn resource_id(&self) -> &str {
        match self {
            ServerEvent::PodUpdate(u) => &u.pod_id,
            ServerEvent::BookingUpdate(u) => &u.booking_id,
        }
    }

    /// Room the event is broadcast to.
    ///
    /// An id that would fail validation yields a room no connection can
    /// have joined, so the event simply reaches nobody.
    pub fn room(&self) -> RoomId {
        RoomId::unvalidated(self.kind(), self.resource_id())
    }

    /// Wire name of the event (`pod-update` / `booking-update`).
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PodUpdate(_) => "pod-update",
            ServerEvent::BookingUpdate(_) => "booking-update",
        }
    }

    /// Convenience constructor for a pod update.
    pub fn pod(pod_id: impl Into<String>, status: PodStatus) -> Self {
        ServerEvent::PodUpdate(PodUpdate {
            pod_id: pod_id.into(),
            status,
        })
    }

    /// Convenience constructor for a booking update.
    pub fn booking(booking_id: impl Into<String>, status: BookingStatus) -> Self {
        ServerEvent::BookingUpdate(BookingUpdate {
            booking_id: booking_id.into(),
            status,
        })
    }
}

impl ServerMessage {
    /// Convenience constructor for a join rejection.
    pub fn join_rejected(room: RoomId, reason: impl Into<String>) -> Self {
        ServerMessage::JoinRejected(JoinRejected {
            room,
            reason: reason.into(),
        })
    }

    /// Room this message concerns, if any.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            ServerMessage::Update(event) => Some(event.room()),
            ServerMessage::Joined(room) | ServerMessage::Left(room) => Some(room.clone()),
            ServerMessage::JoinRejected(rejected) => Some(rejected.room.clone()),
            ServerMessage::Error(_) | ServerMessage::Pong => None,
        }
    }
}

impl From<ServerEvent> for ServerMessage {
    fn from(event: ServerEvent) -> Self {
        ServerMessage::Update(event)
    }
}
