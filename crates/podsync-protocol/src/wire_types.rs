//! Low-level wire names and constants.
//!
//! This module defines:
//! - Event names for client and server frames.
//! - Frame limits.
//! - Codec detection from the first byte of a connection.
//!
//! The actual encode/decode logic lives in `json_codec` and `text_codec`.

use podsync_core::ResourceKind;

/// Longest accepted frame (one line), excluding the trailing newline.
pub const MAX_FRAME_LEN: usize = 4096;

/// Client → server event names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireClientEvent {
    JoinPod,
    JoinBooking,
    LeavePod,
    LeaveBooking,
    UpdatePod,
    UpdateBooking,
    Ping,
}

impl WireClientEvent {
    pub const ALL: [WireClientEvent; 7] = [
        WireClientEvent::JoinPod,
        WireClientEvent::JoinBooking,
        WireClientEvent::LeavePod,
        WireClientEvent::LeaveBooking,
        WireClientEvent::UpdatePod,
        WireClientEvent::UpdateBooking,
        WireClientEvent::Ping,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WireClientEvent::JoinPod => "join-pod",
            WireClientEvent::JoinBooking => "join-booking",
            WireClientEvent::LeavePod => "leave-pod",
            WireClientEvent::LeaveBooking => "leave-booking",
            WireClientEvent::UpdatePod => "update-pod",
            WireClientEvent::UpdateBooking => "update-booking",
            WireClientEvent::Ping => "ping",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        WireClientEvent::ALL.into_iter().find(|e| e.as_str() == name)
    }

    /// `join-*` event for a resource kind.
    pub fn join(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Pod => WireClientEvent::JoinPod,
            ResourceKind::Booking => WireClientEvent::JoinBooking,
        }
    }

    /// `leave-*` event for a resource kind.
    pub fn leave(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Pod => WireClientEvent::LeavePod,
            ResourceKind::Booking => WireClientEvent::LeaveBooking,
        }
    }
}

/// Server → client event names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireServerEvent {
    PodUpdate,
    BookingUpdate,
    Joined,
    Left,
    JoinRejected,
    Error,
    Pong,
}

impl WireServerEvent {
    pub const ALL: [WireServerEvent; 7] = [
        WireServerEvent::PodUpdate,
        WireServerEvent::BookingUpdate,
        WireServerEvent::Joined,
        WireServerEvent::Left,
        WireServerEvent::JoinRejected,
        WireServerEvent::Error,
        WireServerEvent::Pong,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WireServerEvent::PodUpdate => "pod-update",
            WireServerEvent::BookingUpdate => "booking-update",
            WireServerEvent::Joined => "joined",
            WireServerEvent::Left => "left",
            WireServerEvent::JoinRejected => "join-rejected",
            WireServerEvent::Error => "error",
            WireServerEvent::Pong => "pong",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        WireServerEvent::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

/// Which codec a connection speaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Codec {
    /// One JSON object per line.
    Json,
    /// Comma-separated text lines, for `nc` and scripts.
    Text,
}

impl Codec {
    /// Pick a codec from the first byte a client sends.
    ///
    /// JSON frames always open with `{`; every text command starts with a
    /// letter or `#`.
    pub fn detect(first_byte: u8) -> Self {
        if first_byte == b'{' {
            Codec::Json
        } else {
            Codec::Text
        }
    }
}
