//! Status persistence seam.
//!
//! The booking backend owns the real database. This service only needs
//! to know when a status write has committed, so persistence sits behind
//! [`StatusStore`]; [`InMemoryStatusStore`] backs the standalone binary
//! and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use podsync_core::{BookingStatus, PodStatus};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by a status store. A failed write is never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("pod {0} not found")]
    PodNotFound(String),

    #[error("booking {0} not found")]
    BookingNotFound(String),

    #[error("status store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of pod and booking statuses.
///
/// Both methods resolve only after the write has committed.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn set_pod_status(&self, pod_id: &str, status: PodStatus) -> Result<(), StoreError>;

    async fn set_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), StoreError>;
}

/// In-process status store.
///
/// By default unknown ids are created on first write. A strict store only
/// accepts ids it was seeded with.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    pods: RwLock<HashMap<String, PodStatus>>,
    bookings: RwLock<HashMap<String, BookingStatus>>,
    strict: bool,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        InMemoryStatusStore::default()
    }

    /// Store that rejects writes to ids it was not seeded with.
    pub fn strict<P, B>(pods: P, bookings: B) -> Self
    where
        P: IntoIterator<Item = (String, PodStatus)>,
        B: IntoIterator<Item = (String, BookingStatus)>,
    {
        InMemoryStatusStore {
            pods: RwLock::new(pods.into_iter().collect()),
            bookings: RwLock::new(bookings.into_iter().collect()),
            strict: true,
        }
    }

    pub async fn pod_status(&self, pod_id: &str) -> Option<PodStatus> {
        self.pods.read().await.get(pod_id).copied()
    }

    pub async fn booking_status(&self, booking_id: &str) -> Option<BookingStatus> {
        self.bookings.read().await.get(booking_id).copied()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn set_pod_status(&self, pod_id: &str, status: PodStatus) -> Result<(), StoreError> {
        let mut pods = self.pods.write().await;
        match pods.get_mut(pod_id) {
            Some(current) => *current = status,
            None if self.strict => return Err(StoreError::PodNotFound(pod_id.to_string())),
            None => {
                pods.insert(pod_id.to_string(), status);
            }
        }
        Ok(())
    }

    async fn set_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), StoreError> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(booking_id) {
            Some(current) => *current = status,
            None if self.strict => {
                return Err(StoreError::BookingNotFound(booking_id.to_string()))
            }
            None => {
                bookings.insert(booking_id.to_string(), status);
            }
        }
        Ok(())
    }
}
