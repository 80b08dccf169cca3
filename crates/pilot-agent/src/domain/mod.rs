//! Domain layer for the agent: runtime configuration.

/// Agent configuration struct and defaults.
pub mod config;

pub use config::AgentConfig;
