//! JSON message types for the relay socket.
//!
//! Every frame on the session WebSocket is a JSON object with optional
//! fields; the schema is deliberately loose because the same shape is used
//! in both directions:
//!
//! ```json
//! {"source":"<device-id>","data":"browse example.com"}
//! {"source":"<device-id>","status":"ready"}
//! {"source":"<device-id>","signal":{ ...opaque peer signaling blob... }}
//! {"payload":"Browsing resource..."}
//! ```
//!
//! At most one of `data` / `status` / `signal` is semantically primary per
//! message, although the schema allows co-presence; the session dispatcher
//! checks them in a fixed order and handles each independently.

use serde::{Deserialize, Serialize};

// ── Relay socket message ──────────────────────────────────────────────────────

/// One frame on the relay session socket, either direction.
///
/// Absent fields are omitted from the serialized object entirely (the relay
/// fans frames out verbatim, and controllers treat a `null` field the same
/// as a missing one — omitting keeps frames small and unambiguous).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Device id of the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// A command phrase for the receiving device to interpret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// A presence/lifecycle note (`"ready"`, `"paired"`, `"online"`, ...).
    ///
    /// Status messages trigger a local notification on the controlled
    /// device and never change command state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// An opaque peer signaling blob.
    ///
    /// The session layer does not interpret this; it is handed to the peer
    /// relay bridge (outbound: wrapped with `source`; inbound: fed to the
    /// local peer instance).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<serde_json::Value>,
}

impl RelayMessage {
    /// A message carrying only a status note.
    pub fn status(source: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// A message carrying only a signaling blob.
    pub fn signal(source: impl Into<String>, signal: serde_json::Value) -> Self {
        Self {
            source: Some(source.into()),
            signal: Some(signal),
            ..Self::default()
        }
    }
}

// ── Command response ──────────────────────────────────────────────────────────

/// The acknowledgement sent back to the controller after executing a phrase.
///
/// Only ever carries a `payload`.  When execution fails, the session layer
/// substitutes a generic payload rather than echoing the error text — the
/// real error is surfaced locally, never to the remote caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Human-readable acknowledgement text.
    pub payload: String,
}

impl CommandResponse {
    /// The generic acknowledgement used in place of an error.
    pub const GENERIC_ACK: &'static str = "Message sent";

    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The information-hiding acknowledgement for failed executions.
    pub fn generic() -> Self {
        Self::new(Self::GENERIC_ACK)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
