//! Error types for the live-sync core.
//!
//! The core API is infallible for registry operations; the only
//! fallible paths are the constructors that turn untrusted strings
//! (resource ids, room ids, status names) into typed values.

use thiserror::Error;

/// Errors raised while validating identifiers or status names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The resource id is empty.
    #[error("resource id is empty")]
    EmptyResourceId,

    /// The resource id exceeds [`crate::resource::MAX_RESOURCE_ID_LEN`].
    #[error("resource id is {0} bytes, longer than the allowed maximum")]
    ResourceIdTooLong(usize),

    /// The resource id contains a character reserved by the room or text formats.
    #[error("resource id contains reserved character {0:?}")]
    ReservedCharacter(char),

    /// The resource kind prefix is not `pod` or `booking`.
    #[error("unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// A room string without the `kind:id` shape.
    #[error("malformed room id: {0}")]
    MalformedRoom(String),

    /// A status name that does not belong to the status vocabulary.
    #[error("unknown {kind} status: {value}")]
    UnknownStatus {
        kind: &'static str,
        value: String,
    },
}
