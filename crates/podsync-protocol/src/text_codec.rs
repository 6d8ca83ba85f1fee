// crates/podsync-protocol/src/text_codec.rs

//! Text line codec.
//!
//! A comma-separated form of the protocol, so a room can be watched
//! with nothing more than `nc`.
//!
//! Input format (lines → `ClientMessage`):
//!
//! - Join / leave:
//!   `join-pod, id` / `join-booking, id` / `leave-pod, id` / `leave-booking, id`
//!
//! - Status change:
//!   `update-pod, id, STATUS` / `update-booking, id, STATUS`
//!
//! - Liveness:
//!   `ping`
//!
//! Output format (`ServerMessage` → line):
//!
//! - Updates:
//!   `pod-update, id, STATUS` / `booking-update, id, STATUS`
//!
//! - Acknowledgements:
//!   `joined, kind:id` / `left, kind:id`
//!
//! - Refusals and errors:
//!   `join-rejected, kind:id, reason` / `error, message`
//!
//! - Liveness:
//!   `pong`
//!
//! Free text (reasons, error messages) is always the last field and may
//! itself contain commas.

use podsync_core::{
    BookingUpdate, ClientMessage, JoinRejected, PodUpdate, RoomId, ServerEvent, ServerMessage,
};

use crate::error::ProtocolError;
use crate::wire_types::{WireClientEvent, WireServerEvent, MAX_FRAME_LEN};

/// Parse a single text line into a `ClientMessage`.
///
/// Returns `Ok(None)` for blank lines or comments (starting with `#`).
pub fn parse_client_line(line: &str) -> Result<Option<ClientMessage>, ProtocolError> {
    let tokens = match tokenize(line)? {
        Some(tokens) => tokens,
        None => return Ok(None),
    };

    let event = WireClientEvent::from_name(&tokens[0])
        .ok_or_else(|| ProtocolError::UnknownEvent(tokens[0].clone()))?;

    let msg = match event {
        WireClientEvent::JoinPod => ClientMessage::Join(RoomId::pod(single_id(event, &tokens)?)?),
        WireClientEvent::JoinBooking => {
            ClientMessage::Join(RoomId::booking(single_id(event, &tokens)?)?)
        }
        WireClientEvent::LeavePod => ClientMessage::Leave(RoomId::pod(single_id(event, &tokens)?)?),
        WireClientEvent::LeaveBooking => {
            ClientMessage::Leave(RoomId::booking(single_id(event, &tokens)?)?)
        }
        WireClientEvent::UpdatePod => {
            let (id, status) = id_and_status(event, &tokens)?;
            ClientMessage::UpdatePod(PodUpdate {
                pod_id: id,
                status: status.parse()?,
            })
        }
        WireClientEvent::UpdateBooking => {
            let (id, status) = id_and_status(event, &tokens)?;
            ClientMessage::UpdateBooking(BookingUpdate {
                booking_id: id,
                status: status.parse()?,
            })
        }
        WireClientEvent::Ping => {
            expect_arity(event, &tokens, 0)?;
            ClientMessage::Ping
        }
    };

    Ok(Some(msg))
}

/// Format a `ClientMessage` as a text line (no trailing newline).
pub fn format_client(msg: &ClientMessage) -> String {
    match msg {
        ClientMessage::Join(room) => {
            format!("{}, {}", WireClientEvent::join(room.kind()).as_str(), room.resource_id())
        }
        ClientMessage::Leave(room) => {
            format!("{}, {}", WireClientEvent::leave(room.kind()).as_str(), room.resource_id())
        }
        ClientMessage::UpdatePod(u) => format!(
            "{}, {}, {}",
            WireClientEvent::UpdatePod.as_str(),
            u.pod_id,
            u.status
        ),
        ClientMessage::UpdateBooking(u) => format!(
            "{}, {}, {}",
            WireClientEvent::UpdateBooking.as_str(),
            u.booking_id,
            u.status
        ),
        ClientMessage::Ping => WireClientEvent::Ping.as_str().to_string(),
    }
}

/// Format a `ServerMessage` as a text line (no trailing newline).
pub fn format_server(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::Update(ServerEvent::PodUpdate(u)) => format!(
            "{}, {}, {}",
            WireServerEvent::PodUpdate.as_str(),
            u.pod_id,
            u.status
        ),
        ServerMessage::Update(ServerEvent::BookingUpdate(u)) => format!(
            "{}, {}, {}",
            WireServerEvent::BookingUpdate.as_str(),
            u.booking_id,
            u.status
        ),
        ServerMessage::Joined(room) => format!("{}, {}", WireServerEvent::Joined.as_str(), room),
        ServerMessage::Left(room) => format!("{}, {}", WireServerEvent::Left.as_str(), room),
        ServerMessage::JoinRejected(r) => format!(
            "{}, {}, {}",
            WireServerEvent::JoinRejected.as_str(),
            r.room,
            single_line(&r.reason)
        ),
        ServerMessage::Error(message) => {
            format!("{}, {}", WireServerEvent::Error.as_str(), single_line(message))
        }
        ServerMessage::Pong => WireServerEvent::Pong.as_str().to_string(),
    }
}

/// Parse a text line produced by [`format_server`].
pub fn parse_server_line(line: &str) -> Result<Option<ServerMessage>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    if trimmed.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLong(trimmed.len()));
    }

    let (head, rest) = match trimmed.split_once(',') {
        Some((head, rest)) => (head.trim(), Some(rest.trim())),
        None => (trimmed, None),
    };

    let event = WireServerEvent::from_name(head)
        .ok_or_else(|| ProtocolError::UnknownEvent(head.to_string()))?;

    let msg = match (event, rest) {
        (WireServerEvent::Pong, None) => ServerMessage::Pong,
        (WireServerEvent::Error, Some(message)) => ServerMessage::Error(message.to_string()),
        (WireServerEvent::Joined, Some(room)) => ServerMessage::Joined(room.parse()?),
        (WireServerEvent::Left, Some(room)) => ServerMessage::Left(room.parse()?),
        (WireServerEvent::JoinRejected, Some(rest)) => {
            let (room, reason) = rest.split_once(',').ok_or(ProtocolError::WrongArity {
                event: event.as_str(),
                expected: 2,
                got: 1,
            })?;
            ServerMessage::JoinRejected(JoinRejected {
                room: room.trim().parse()?,
                reason: reason.trim().to_string(),
            })
        }
        (WireServerEvent::PodUpdate, Some(rest)) | (WireServerEvent::BookingUpdate, Some(rest)) => {
            let fields: Vec<String> = split_and_trim(rest, ',');
            if fields.len() != 2 {
                return Err(ProtocolError::WrongArity {
                    event: event.as_str(),
                    expected: 2,
                    got: fields.len(),
                });
            }
            podsync_core::validate_resource_id(&fields[0])?;
            if event == WireServerEvent::PodUpdate {
                ServerEvent::pod(fields[0].clone(), fields[1].parse()?).into()
            } else {
                ServerEvent::booking(fields[0].clone(), fields[1].parse()?).into()
            }
        }
        (event, rest) => {
            return Err(ProtocolError::WrongArity {
                event: event.as_str(),
                expected: usize::from(rest.is_none()),
                got: usize::from(rest.is_some()),
            })
        }
    };

    Ok(Some(msg))
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn tokenize(line: &str) -> Result<Option<Vec<String>>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    if trimmed.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLong(trimmed.len()));
    }
    Ok(Some(split_and_trim(trimmed, ',')))
}

fn expect_arity(
    event: WireClientEvent,
    tokens: &[String],
    expected: usize,
) -> Result<(), ProtocolError> {
    let got = tokens.len() - 1;
    if got != expected {
        return Err(ProtocolError::WrongArity {
            event: event.as_str(),
            expected,
            got,
        });
    }
    Ok(())
}

fn single_id(event: WireClientEvent, tokens: &[String]) -> Result<String, ProtocolError> {
    expect_arity(event, tokens, 1)?;
    Ok(tokens[1].clone())
}

fn id_and_status(
    event: WireClientEvent,
    tokens: &[String],
) -> Result<(String, String), ProtocolError> {
    expect_arity(event, tokens, 2)?;
    podsync_core::validate_resource_id(&tokens[1])?;
    Ok((tokens[1].clone(), tokens[2].clone()))
}

fn split_and_trim(s: &str, delimiter: char) -> Vec<String> {
    s.split(delimiter).map(|tok| tok.trim().to_string()).collect()
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
