//! Desktop capability providers.
//!
//! [`shell::ShellSystemActions`] is the production implementation; it shells
//! out to the platform's own tooling (`xdotool`, PowerShell, `osascript`).
//! [`mock::MockSystemActions`] records every call in memory for tests.

pub mod mock;
pub mod shell;

pub use mock::MockSystemActions;
pub use shell::ShellSystemActions;
