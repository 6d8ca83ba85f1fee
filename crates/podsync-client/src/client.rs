// crates/podsync-client/src/client.rs

use std::sync::Arc;

use podsync_core::{
    validate_resource_id, BookingStatus, BookingUpdate, ClientMessage, PodStatus, PodUpdate, RoomId,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::network::SyncConnection;
use crate::subscription::{Subscription, SubscriptionHub};
use crate::types::ClientConfig;

/// Handle to a running sync connection. Clones share the connection.
#[derive(Clone)]
pub struct SyncClient {
    hub: Arc<SubscriptionHub>,
    outbound: UnboundedSender<ClientMessage>,
    shutdown: CancellationToken,
}

impl SyncClient {
    /// Connect once, then keep the connection alive in a background task.
    ///
    /// Fails if the first connection attempt fails; later drops are
    /// retried with backoff.
    pub async fn connect(config: ClientConfig) -> Result<(Self, JoinHandle<()>), ClientError> {
        let (outbound, rx) = mpsc::unbounded_channel();
        let hub = SubscriptionHub::new(outbound.clone());

        let mut connection = SyncConnection::new(config, Arc::clone(&hub));
        connection.connect().await?;

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move {
            connection.run(rx, token).await;
        });

        Ok((
            SyncClient {
                hub,
                outbound,
                shutdown,
            },
            task,
        ))
    }

    pub fn subscribe(&self, room: RoomId) -> Subscription {
        self.hub.subscribe(room)
    }

    pub fn watch_pod(&self, pod_id: &str) -> Result<Subscription, ClientError> {
        Ok(self.subscribe(RoomId::pod(pod_id)?))
    }

    pub fn watch_booking(&self, booking_id: &str) -> Result<Subscription, ClientError> {
        Ok(self.subscribe(RoomId::booking(booking_id)?))
    }

    pub fn update_pod_status(&self, pod_id: &str, status: PodStatus) -> Result<(), ClientError> {
        validate_resource_id(pod_id)?;
        self.send(ClientMessage::UpdatePod(PodUpdate {
            pod_id: pod_id.to_string(),
            status,
        }))
    }

    pub fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), ClientError> {
        validate_resource_id(booking_id)?;
        self.send(ClientMessage::UpdateBooking(BookingUpdate {
            booking_id: booking_id.to_string(),
            status,
        }))
    }

    pub fn hub(&self) -> &Arc<SubscriptionHub> {
        &self.hub
    }

    /// Stop the background task. Outstanding subscriptions stay valid but
    /// receive nothing further.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        if self.shutdown.is_cancelled() {
            return Err(ClientError::Closed);
        }
        self.outbound.send(msg).map_err(|_| ClientError::Closed)
    }
}
