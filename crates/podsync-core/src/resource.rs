//! Resource kinds and room identifiers.
//!
//! A room is the broadcast scope for a single resource and renders as
//! `{kind}:{id}`, e.g. `pod:abc123` or `booking:xyz789`.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Maximum resource id length in bytes.
///
/// Ids come straight off the wire, so the protocol layer rejects
/// anything longer before it reaches the registry.
pub const MAX_RESOURCE_ID_LEN: usize = 64;

/// The kinds of resource clients can subscribe to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Pod,
    Booking,
}

impl ResourceKind {
    /// Prefix used in room ids and event names.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pod => "pod",
            ResourceKind::Booking => "booking",
        }
    }

    /// Parse the room prefix (`"pod"` / `"booking"`, case-sensitive).
    pub fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "pod" => Some(ResourceKind::Pod),
            "booking" => Some(ResourceKind::Booking),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `id` is usable as a resource id.
///
/// Ids must be non-empty, at most [`MAX_RESOURCE_ID_LEN`] bytes, and
/// free of whitespace, `:` and `,`.
pub fn validate_resource_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() {
        return Err(CoreError::EmptyResourceId);
    }
    if id.len() > MAX_RESOURCE_ID_LEN {
        return Err(CoreError::ResourceIdTooLong(id.len()));
    }
    if let Some(c) = id.chars().find(|c| c.is_whitespace() || *c == ':' || *c == ',') {
        return Err(CoreError::ReservedCharacter(c));
    }
    Ok(())
}

/// Identifier of a resource-scoped broadcast room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId {
    kind: ResourceKind,
    resource_id: String,
}

impl RoomId {
    /// Build a room id, validating the resource id.
    pub fn new(kind: ResourceKind, resource_id: impl Into<String>) -> Result<Self, CoreError> {
        let resource_id = resource_id.into();
        validate_resource_id(&resource_id)?;
        Ok(RoomId { kind, resource_id })
    }

    /// Room for a pod.
    pub fn pod(resource_id: impl Into<String>) -> Result<Self, CoreError> {
        RoomId::new(ResourceKind::Pod, resource_id)
    }

    /// Room for a booking.
    pub fn booking(resource_id: impl Into<String>) -> Result<Self, CoreError> {
        RoomId::new(ResourceKind::Booking, resource_id)
    }

    pub(crate) fn unvalidated(kind: ResourceKind, resource_id: &str) -> Self {
        RoomId {
            kind,
            resource_id: resource_id.to_string(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.resource_id)
    }
}

impl FromStr for RoomId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s
            .split_once(':')
            .ok_or_else(|| CoreError::MalformedRoom(s.to_string()))?;
        let kind = ResourceKind::from_prefix(prefix)
            .ok_or_else(|| CoreError::UnknownResourceKind(prefix.to_string()))?;
        RoomId::new(kind, id)
    }
}
