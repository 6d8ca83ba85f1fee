use std::io;
use std::path::PathBuf;

use podsync_core::{CoreError, RoomId};
use podsync_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    InvalidId(#[from] CoreError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("not connected")]
    NotConnected,

    #[error("join to {room} rejected: {reason}")]
    JoinRejected { room: RoomId, reason: String },

    #[error("sync connection closed")]
    Closed,
}
