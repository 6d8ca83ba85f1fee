use podsync_core::CoreError;
use thiserror::Error;

/// Errors that can arise when encoding/decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Blank frame where a message was expected.
    #[error("empty frame")]
    EmptyFrame,

    /// Frame longer than [`crate::wire_types::MAX_FRAME_LEN`].
    #[error("frame is {0} bytes, longer than the allowed maximum")]
    FrameTooLong(usize),

    /// Event name not part of the protocol.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Text frame with the wrong number of fields for its event.
    #[error("event {event} expects {expected} field(s), got {got}")]
    WrongArity {
        event: &'static str,
        expected: usize,
        got: usize,
    },

    /// Malformed JSON or a JSON shape that does not match any event.
    #[error("invalid json frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed frame carrying an invalid id, room or status.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}
