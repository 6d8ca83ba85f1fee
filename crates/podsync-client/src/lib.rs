//! podsync-client
//!
//! Client side of live pod / booking sync:
//! - [`SyncClient`]: reconnecting connection handle
//! - [`Subscription`]: one room watched by one view, released on drop
//! - [`CachedCollection`] / [`LiveStore`]: local record lists patched by
//!   live events

pub mod cache;
pub mod client;
pub mod error;
pub mod network;
pub mod store;
pub mod subscription;
pub mod types;

pub use cache::{ApplyOutcome, CacheRecord, CachedCollection};
pub use client::SyncClient;
pub use error::ClientError;
pub use store::{BookingPatch, BookingRecord, LiveStore, PodPatch, PodRecord};
pub use subscription::{RoomEvent, Subscription, SubscriptionHub};
pub use types::ClientConfig;
