//! podsync-core
//!
//! Pure live-sync logic:
//! - resource kinds and room ids
//! - pod / booking status vocabularies
//! - messages (client requests, server events)
//! - room membership registry

pub mod error;
pub mod messages;
pub mod registry;
pub mod resource;
pub mod status;

pub use error::CoreError;

pub use messages::{
    BookingUpdate,
    ClientMessage,
    JoinRejected,
    PodUpdate,
    ServerEvent,
    ServerMessage,
};

pub use registry::{ConnectionId, RoomRegistry};
pub use resource::{validate_resource_id, ResourceKind, RoomId, MAX_RESOURCE_ID_LEN};
pub use status::{BookingStatus, PodStatus};
