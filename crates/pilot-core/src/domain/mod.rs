//! Domain entities for DeskPilot.
//!
//! Pure business types with no infrastructure dependencies: the controlled
//! device's identity, the platform enum, user-authored custom commands, and
//! the execution result union.  Everything here can be constructed and
//! tested without an OS, a network, or a desktop session.

/// Device identity and platform detection.
pub mod device;

/// Custom commands and the execution result union.
pub mod commands;
