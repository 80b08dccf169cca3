//! Application layer: use cases for the agent.
//!
//! Everything here is expressed against traits ([`actions::SystemActions`],
//! [`session::SocketSink`], [`session::Notifier`], [`peer::PeerConnector`])
//! so the logic can be unit-tested with the recording mocks in the
//! infrastructure layer and never touches the OS or the network directly.

/// The `SystemActions` capability trait the executor requires from the host.
pub mod actions;

/// Ordered pattern→binding table and custom-command pre-emption.
pub mod matcher;

/// The command executor service: phrase in, `ExecutionResult` out.
pub mod executor;

/// Pairing session state machine and the inbound-event dispatch loop.
pub mod session;

/// Peer relay bridge: supplementary media/data peer with self-healing.
pub mod peer;

pub use actions::{ActionError, ProcessOutput, SystemActions};
pub use executor::CommandExecutor;
pub use session::{Notifier, SessionEvent, SessionState};
