//! Agent configuration types.
//!
//! [`AgentConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! Keeping configuration as a plain struct — no global state, no environment
//! variable reads inside the domain — makes the agent easy to embed in tests.
//! The binary entry point is responsible for populating the struct from CLI
//! args or environment variables.

/// All runtime configuration for the agent.
///
/// Build this struct once at startup and share it by reference (or `Arc`)
/// with the session manager and relay clients.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Relay host name or IP address.
    pub relay_host: String,

    /// Relay TCP port (HTTP endpoints and the WebSocket share it).
    pub relay_port: u16,

    /// Device name announced to controllers.  `None` means "use the OS
    /// hostname detected at startup".
    pub device_name: Option<String>,
}

impl AgentConfig {
    /// Base origin for the relay HTTP endpoints, e.g. `http://localhost:49150`.
    pub fn http_origin(&self) -> String {
        format!("http://{}:{}", self.relay_host, self.relay_port)
    }

    /// WebSocket URL for the session socket, e.g. `ws://localhost:49150`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.relay_host, self.relay_port)
    }
}

impl Default for AgentConfig {
    /// Defaults match a relay running locally on its standard port.
    fn default() -> Self {
        Self {
            relay_host: "localhost".to_string(),
            relay_port: 49150,
            device_name: None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
