//! Relay server integration: the HTTP control API and the WebSocket
//! session transport.

pub mod http;
pub mod socket;

pub use http::{RelayApi, RelayError};
pub use socket::RelaySession;
