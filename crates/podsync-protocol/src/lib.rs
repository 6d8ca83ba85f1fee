//! podsync-protocol
//!
//! Wire-level encoding/decoding for the live-sync service.
//!
//! This crate turns logical messages (`podsync_core::ClientMessage` /
//! `ServerMessage`) into lines of text and back again.
//!
//! - [`json_codec`] : JSON-lines protocol (used by `podsync-client`)
//! - [`text_codec`] : comma-separated text (for `nc` and scripts)
//!
//! Both codecs are line-framed: one message per `\n`-terminated line.

pub mod error;
pub mod json_codec;
pub mod text_codec;
pub mod wire_types;

pub use error::ProtocolError;
pub use wire_types::{Codec, MAX_FRAME_LEN};

use podsync_core::{ClientMessage, ServerMessage};

impl Codec {
    /// Decode a client line with this codec.
    ///
    /// Returns `Ok(None)` for lines the codec ignores (blank lines, text
    /// comments).
    pub fn decode_client(self, line: &str) -> Result<Option<ClientMessage>, ProtocolError> {
        match self {
            Codec::Json if line.trim().is_empty() => Ok(None),
            Codec::Json => json_codec::decode_client(line).map(Some),
            Codec::Text => text_codec::parse_client_line(line),
        }
    }

    /// Encode a server message with this codec, newline-terminated.
    pub fn encode_server(self, msg: &ServerMessage) -> Result<String, ProtocolError> {
        let mut line = match self {
            Codec::Json => json_codec::encode_server(msg)?,
            Codec::Text => text_codec::format_server(msg),
        };
        line.push('\n');
        Ok(line)
    }
}
