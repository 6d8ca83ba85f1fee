//! Status mutations that notify subscribers.
//!
//! Each operation awaits the store, and only a committed write is
//! broadcast. Broadcast problems never surface to the caller.

use std::sync::Arc;

use podsync_core::{BookingStatus, PodStatus, ServerEvent};
use tracing::{info, warn};

use crate::emitter::EventEmitter;
use crate::store::{StatusStore, StoreError};

#[derive(Clone)]
pub struct StatusService {
    store: Arc<dyn StatusStore>,
    emitter: EventEmitter,
}

impl StatusService {
    pub fn new(store: Arc<dyn StatusStore>, emitter: EventEmitter) -> Self {
        StatusService { store, emitter }
    }

    /// Persist a pod status and notify `pod:{pod_id}`.
    pub async fn update_pod_status(
        &self,
        pod_id: &str,
        status: PodStatus,
    ) -> Result<(), StoreError> {
        let committed = self.store.set_pod_status(pod_id, status).await;
        if let Err(e) = &committed {
            warn!(pod_id, %status, error = %e, "pod status write failed");
        } else {
            info!(pod_id, %status, "pod status updated");
        }
        self.emitter
            .emit_after_commit(committed, ServerEvent::pod(pod_id, status))
            .await
    }

    /// Persist a booking status and notify `booking:{booking_id}`.
    pub async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), StoreError> {
        let committed = self.store.set_booking_status(booking_id, status).await;
        if let Err(e) = &committed {
            warn!(booking_id, %status, error = %e, "booking status write failed");
        } else {
            info!(booking_id, %status, "booking status updated");
        }
        self.emitter
            .emit_after_commit(committed, ServerEvent::booking(booking_id, status))
            .await
    }
}
