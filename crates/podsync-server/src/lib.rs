//! podsync-server
//!
//! Multi-client async TCP server for live pod / booking status updates.

pub mod auth;
pub mod config;
pub mod emitter;
pub mod server;
pub mod service;
pub mod store;
pub mod types;

// internal module, not re-exported
mod client;

pub use auth::{JoinAuthorizer, JoinDenied, RoomPolicy};
pub use config::Config;
pub use emitter::EventEmitter;
pub use server::{Server, ServerHandle};
pub use service::StatusService;
pub use store::{InMemoryStatusStore, StatusStore, StoreError};
pub use types::ServerStats;
