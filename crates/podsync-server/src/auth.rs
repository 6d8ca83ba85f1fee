//! Join authorization.
//!
//! Every `join-*` passes through a [`JoinAuthorizer`] before the room
//! registry sees it. Identity is established outside this service, so the
//! hook only gets the connection id and the requested room.

use std::fmt;
use std::str::FromStr;

use podsync_core::{ConnectionId, ResourceKind, RoomId};
use thiserror::Error;

/// A refused join, reported back to the client as `join-rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct JoinDenied {
    pub reason: String,
}

impl JoinDenied {
    pub fn new(reason: impl Into<String>) -> Self {
        JoinDenied {
            reason: reason.into(),
        }
    }
}

/// Decides whether a connection may join a room.
pub trait JoinAuthorizer: Send + Sync {
    fn authorize(&self, connection: ConnectionId, room: &RoomId) -> Result<(), JoinDenied>;
}

impl<F> JoinAuthorizer for F
where
    F: Fn(ConnectionId, &RoomId) -> Result<(), JoinDenied> + Send + Sync,
{
    fn authorize(&self, connection: ConnectionId, room: &RoomId) -> Result<(), JoinDenied> {
        self(connection, room)
    }
}

/// Built-in policies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomPolicy {
    /// Any connection may join any room.
    #[default]
    Open,

    /// Pod status is public; booking rooms are refused.
    PodsOnly,
}

impl JoinAuthorizer for RoomPolicy {
    fn authorize(&self, _connection: ConnectionId, room: &RoomId) -> Result<(), JoinDenied> {
        match (self, room.kind()) {
            (RoomPolicy::Open, _) | (RoomPolicy::PodsOnly, ResourceKind::Pod) => Ok(()),
            (RoomPolicy::PodsOnly, ResourceKind::Booking) => Err(JoinDenied::new(
                "booking rooms are not open on this server",
            )),
        }
    }
}

/// Unknown policy name in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown room policy {0:?} (expected \"open\" or \"pods-only\")")]
pub struct UnknownPolicy(pub String);

impl FromStr for RoomPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(RoomPolicy::Open),
            "pods-only" => Ok(RoomPolicy::PodsOnly),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for RoomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomPolicy::Open => f.write_str("open"),
            RoomPolicy::PodsOnly => f.write_str("pods-only"),
        }
    }
}
