//! JSON-lines codec.
//!
//! Each frame is one JSON object on its own line, adjacently tagged:
//!
//! ```text
//! {"event":"join-pod","data":"p1"}
//! {"event":"update-booking","data":{"id":"b1","status":"CONFIRMED"}}
//! {"event":"pod-update","data":{"id":"p1","status":"OCCUPIED"}}
//! {"event":"joined","data":"pod:p1"}
//! {"event":"join-rejected","data":{"room":"booking:b1","reason":"..."}}
//! {"event":"ping"}
//! ```
//!
//! The serde types here are private mirrors of the `podsync_core`
//! messages; ids and statuses are re-validated on the way in.

use podsync_core::{
    BookingUpdate, ClientMessage, JoinRejected, PodUpdate, ResourceKind, RoomId, ServerEvent,
    ServerMessage,
};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::wire_types::MAX_FRAME_LEN;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum WireClient {
    JoinPod(String),
    JoinBooking(String),
    LeavePod(String),
    LeaveBooking(String),
    UpdatePod(WireUpdate),
    UpdateBooking(WireUpdate),
    Ping,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum WireServer {
    PodUpdate(WireUpdate),
    BookingUpdate(WireUpdate),
    Joined(String),
    Left(String),
    JoinRejected(WireRejection),
    Error(WireError),
    Pong,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireUpdate {
    id: String,
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireRejection {
    room: String,
    reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireError {
    message: String,
}

// ============================================================================
// Client → server
// ============================================================================

/// Decode one client frame (without the trailing newline).
pub fn decode_client(line: &str) -> Result<ClientMessage, ProtocolError> {
    let wire: WireClient = serde_json::from_str(check_frame(line)?)?;

    let msg = match wire {
        WireClient::JoinPod(id) => ClientMessage::Join(RoomId::pod(id)?),
        WireClient::JoinBooking(id) => ClientMessage::Join(RoomId::booking(id)?),
        WireClient::LeavePod(id) => ClientMessage::Leave(RoomId::pod(id)?),
        WireClient::LeaveBooking(id) => ClientMessage::Leave(RoomId::booking(id)?),
        WireClient::UpdatePod(u) => ClientMessage::UpdatePod(pod_update(u)?),
        WireClient::UpdateBooking(u) => ClientMessage::UpdateBooking(booking_update(u)?),
        WireClient::Ping => ClientMessage::Ping,
    };

    Ok(msg)
}

/// Encode one client frame, without a trailing newline.
pub fn encode_client(msg: &ClientMessage) -> Result<String, ProtocolError> {
    let wire = match msg {
        ClientMessage::Join(room) => match room.kind() {
            ResourceKind::Pod => WireClient::JoinPod(room.resource_id().to_string()),
            ResourceKind::Booking => WireClient::JoinBooking(room.resource_id().to_string()),
        },
        ClientMessage::Leave(room) => match room.kind() {
            ResourceKind::Pod => WireClient::LeavePod(room.resource_id().to_string()),
            ResourceKind::Booking => WireClient::LeaveBooking(room.resource_id().to_string()),
        },
        ClientMessage::UpdatePod(u) => WireClient::UpdatePod(WireUpdate {
            id: u.pod_id.clone(),
            status: u.status.to_string(),
        }),
        ClientMessage::UpdateBooking(u) => WireClient::UpdateBooking(WireUpdate {
            id: u.booking_id.clone(),
            status: u.status.to_string(),
        }),
        ClientMessage::Ping => WireClient::Ping,
    };

    Ok(serde_json::to_string(&wire)?)
}

// ============================================================================
// Server → client
// ============================================================================

/// Decode one server frame (without the trailing newline).
pub fn decode_server(line: &str) -> Result<ServerMessage, ProtocolError> {
    let wire: WireServer = serde_json::from_str(check_frame(line)?)?;

    let msg = match wire {
        WireServer::PodUpdate(u) => ServerEvent::PodUpdate(pod_update(u)?).into(),
        WireServer::BookingUpdate(u) => ServerEvent::BookingUpdate(booking_update(u)?).into(),
        WireServer::Joined(room) => ServerMessage::Joined(room.parse()?),
        WireServer::Left(room) => ServerMessage::Left(room.parse()?),
        WireServer::JoinRejected(r) => ServerMessage::JoinRejected(JoinRejected {
            room: r.room.parse()?,
            reason: r.reason,
        }),
        WireServer::Error(e) => ServerMessage::Error(e.message),
        WireServer::Pong => ServerMessage::Pong,
    };

    Ok(msg)
}

/// Encode one server frame, without a trailing newline.
pub fn encode_server(msg: &ServerMessage) -> Result<String, ProtocolError> {
    let wire = match msg {
        ServerMessage::Update(ServerEvent::PodUpdate(u)) => WireServer::PodUpdate(WireUpdate {
            id: u.pod_id.clone(),
            status: u.status.to_string(),
        }),
        ServerMessage::Update(ServerEvent::BookingUpdate(u)) => {
            WireServer::BookingUpdate(WireUpdate {
                id: u.booking_id.clone(),
                status: u.status.to_string(),
            })
        }
        ServerMessage::Joined(room) => WireServer::Joined(room.to_string()),
        ServerMessage::Left(room) => WireServer::Left(room.to_string()),
        ServerMessage::JoinRejected(r) => WireServer::JoinRejected(WireRejection {
            room: r.room.to_string(),
            reason: r.reason.clone(),
        }),
        ServerMessage::Error(message) => WireServer::Error(WireError {
            message: message.clone(),
        }),
        ServerMessage::Pong => WireServer::Pong,
    };

    Ok(serde_json::to_string(&wire)?)
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn check_frame(line: &str) -> Result<&str, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }
    if trimmed.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLong(trimmed.len()));
    }
    Ok(trimmed)
}

fn pod_update(u: WireUpdate) -> Result<PodUpdate, ProtocolError> {
    podsync_core::validate_resource_id(&u.id)?;
    Ok(PodUpdate {
        status: u.status.parse()?,
        pod_id: u.id,
    })
}

fn booking_update(u: WireUpdate) -> Result<BookingUpdate, ProtocolError> {
    podsync_core::validate_resource_id(&u.id)?;
    Ok(BookingUpdate {
        status: u.status.parse()?,
        booking_id: u.id,
    })
}
