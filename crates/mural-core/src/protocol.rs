//! Wire protocol types.
//!
//! Inbound: JSON text frames carrying one [`PixelCommand`] each.
//! Outbound: [`OutboundFrame`]s, either the two-byte `OK` acknowledgement
//! as a text frame or a full-canvas snapshot as a binary frame.

use serde::{Deserialize, Serialize};

/// First path segment a WebSocket upgrade request must target.
pub const ENDPOINT: &str = "tile";

/// Fixed server identifier advertised on the handshake response.
pub const SERVER_IDENT: &str = "mural";

/// Acknowledgement payload for an accepted pixel command.
pub const ACK: &str = "OK";

/// One pixel write, as sent by clients.
///
/// All three fields are required non-negative integers; anything else
/// (missing fields, strings, fractions, negatives) fails deserialization
/// and the command is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCommand {
    pub x: u32,
    pub y: u32,
    pub color: u32,
}

/// One queued outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

impl OutboundFrame {
    /// The `OK` acknowledgement frame.
    pub fn ack() -> Self {
        OutboundFrame::Text(ACK.to_string())
    }

    /// A full-canvas snapshot frame.
    pub fn snapshot(bytes: Vec<u8>) -> Self {
        OutboundFrame::Binary(bytes)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundFrame::Text(_) => "text",
            OutboundFrame::Binary(_) => "binary",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutboundFrame::Text(s) => s.len(),
            OutboundFrame::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
