//! Relay wire protocol for DeskPilot.
//!
//! The relay transports JSON in both directions: HTTP request/response
//! bodies for the device lifecycle endpoints, and JSON text frames on the
//! session WebSocket.  This module defines the socket message schema and
//! the command response shape; the HTTP bodies are small enough that the
//! agent builds them inline with `serde_json::json!`.

/// Socket message schema and the command response envelope.
pub mod messages;
