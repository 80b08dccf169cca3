//! pilot-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pilot-agent do?
//!
//! The *agent* runs on the controlled desktop.  It registers the machine
//! with a relay service, then `listen()` obtains an access key (shared with
//! the controller out-of-band, e.g. as a QR code) and opens the session
//! WebSocket.  From that point on:
//!
//! 1. Controller phrases arriving as `data` frames are matched against an
//!    ordered command table (custom user commands first, then built-ins,
//!    then a catch-all that treats the text as a literal key combination).
//! 2. The matched handler runs local system actions — keystroke injection,
//!    typing, process execution, URL/file opening — through the
//!    `SystemActions` capability trait.
//! 3. The result is serialized back over the socket as `{"payload": ...}`;
//!    failures are notified locally and acknowledged generically so the
//!    remote caller never learns why an execution failed.
//! 4. `signal` frames bypass command handling entirely and feed the peer
//!    relay bridge, which maintains the supplementary media/data peer and
//!    recreates it if it closes while the session is still alive.

/// Domain layer: agent configuration.
pub mod domain;

/// Application layer: matcher, executor, session state machine, peer bridge.
pub mod application;

/// Infrastructure layer: OS adapters, relay HTTP/WebSocket, notifier.
pub mod infrastructure;
