//! # pilot-core
//!
//! Shared library for DeskPilot containing the relay wire protocol types,
//! command domain entities, the platform action registry, and the key-name
//! tables used by the catch-all keystroke binding.
//!
//! This crate is used by the agent application (and any future controller
//! tooling).  It has zero dependencies on OS APIs, UI frameworks, or network
//! sockets.
//!
//! # Architecture overview
//!
//! DeskPilot lets a paired controller drive a desktop remotely.  Short
//! natural-language-like phrases ("browse example.com", "turn off in 2
//! minutes") arrive over a keyed relay session and are translated into local
//! system actions on the controlled device.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`protocol`** – The JSON messages that travel over the relay socket
//!   and the command response shape returned to the controller.
//!
//! - **`domain`** – Pure entities with no OS dependencies: the device
//!   identity, the platform enum, user-defined custom commands, and the
//!   execution result union.
//!
//! - **`actions`** – The platform action registry: per-platform invocation
//!   templates for shutdown/reboot/cancel and the non-symmetric timeout
//!   unit normalization rules.
//!
//! - **`keys`** – Key-name tables and the parsing rules that turn a literal
//!   phrase like `ctrl alt delete` into a key chord the agent can inject.

pub mod actions;
pub mod domain;
pub mod keys;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pilot_core::Platform` instead of `pilot_core::domain::device::Platform`.
pub use actions::{resolve, normalize_timeout, SystemAction, TimeUnit};
pub use domain::commands::{CustomCommand, ExecutionResult};
pub use domain::device::{Device, Platform};
pub use keys::KeyChord;
pub use protocol::messages::{CommandResponse, RelayMessage};
