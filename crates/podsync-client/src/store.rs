// crates/podsync-client/src/store.rs

use podsync_core::{BookingStatus, BookingUpdate, PodStatus, PodUpdate, ServerEvent};

use crate::cache::{ApplyOutcome, CacheRecord, CachedCollection};

/// Client-side copy of a pod.
///
/// Fields the client has not learned yet are `None`; a pod first seen
/// through a live update only knows its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodPatch {
    pub name: Option<String>,
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    pub id: String,
    pub pod_id: Option<String>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub pod_id: Option<String>,
    pub status: Option<BookingStatus>,
}

impl PodRecord {
    pub fn new(id: impl Into<String>, status: PodStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            status: Some(status),
        }
    }
}

impl BookingRecord {
    pub fn new(id: impl Into<String>, status: BookingStatus) -> Self {
        Self {
            id: id.into(),
            pod_id: None,
            status: Some(status),
        }
    }
}

impl CacheRecord for PodRecord {
    type Patch = PodPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_patch(id: &str, patch: &PodPatch) -> Self {
        Self {
            id: id.to_string(),
            name: patch.name.clone(),
            status: patch.status,
        }
    }

    fn merge(&mut self, patch: &PodPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
    }
}

impl CacheRecord for BookingRecord {
    type Patch = BookingPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_patch(id: &str, patch: &BookingPatch) -> Self {
        Self {
            id: id.to_string(),
            pod_id: patch.pod_id.clone(),
            status: patch.status,
        }
    }

    fn merge(&mut self, patch: &BookingPatch) {
        if let Some(pod_id) = &patch.pod_id {
            self.pod_id = Some(pod_id.clone());
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
    }
}

impl From<&PodUpdate> for PodPatch {
    fn from(update: &PodUpdate) -> Self {
        PodPatch {
            name: None,
            status: Some(update.status),
        }
    }
}

impl From<&BookingUpdate> for BookingPatch {
    fn from(update: &BookingUpdate) -> Self {
        BookingPatch {
            pod_id: None,
            status: Some(update.status),
        }
    }
}

/// The pod and booking lists the client renders, kept current by live
/// events.
#[derive(Debug, Default)]
pub struct LiveStore {
    pub pods: CachedCollection<PodRecord>,
    pub bookings: CachedCollection<BookingRecord>,
    events_applied: u64,
}

impl LiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch the matching collection with a server event.
    pub fn apply_event(&mut self, event: &ServerEvent) -> ApplyOutcome {
        self.events_applied += 1;
        match event {
            ServerEvent::PodUpdate(update) => {
                self.pods.apply(&update.pod_id, &PodPatch::from(update))
            }
            ServerEvent::BookingUpdate(update) => self
                .bookings
                .apply(&update.booking_id, &BookingPatch::from(update)),
        }
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }
}
