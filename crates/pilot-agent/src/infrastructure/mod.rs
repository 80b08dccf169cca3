//! Infrastructure layer: everything that touches the outside world.
//!
//! - [`system`]: desktop capability providers (shell-backed and mock).
//! - [`relay`]: HTTP client and WebSocket session against the relay server.
//! - [`peer`]: peer media connectors for the streaming side channel.
//! - [`notify`]: desktop notification delivery.
//! - [`identity`]: stable device identity detection.

pub mod identity;
pub mod notify;
pub mod peer;
pub mod relay;
pub mod system;
