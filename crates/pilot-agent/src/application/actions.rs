//! The `SystemActions` capability trait: everything the executor may do to
//! the host machine.
//!
//! The executor never talks to the OS directly.  It requires this small
//! capability set from its environment, which keeps the matcher/executor
//! logic pure enough to unit-test with the recording mock in
//! `infrastructure::system::mock`.
//!
//! All capabilities except [`SystemActions::run_process`] are fire-and-forget
//! from the executor's perspective: they either queue the side effect or fail
//! immediately.  `run_process` is async and its completion gates the
//! execution result, because command output becomes the success payload.

use async_trait::async_trait;
use thiserror::Error;

use pilot_core::Platform;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors a capability invocation can produce.
///
/// These never escape the executor boundary as `Err` — the executor converts
/// every one of them into an `ExecutionResult::Failure`.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The underlying system call / spawn / IO failed.
    #[error("{0}")]
    Invocation(String),

    /// A process ran but exited with a non-zero status.
    #[error("process exited with status {status}: {output}")]
    ProcessFailed {
        status: i32,
        /// Combined stdout+stderr text, trimmed.
        output: String,
    },

    /// The action has no implementation on this platform.
    #[error("unsupported on this platform")]
    Unsupported,
}

// ── Process output ────────────────────────────────────────────────────────────

/// Captured output of a completed process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Stdout and stderr concatenated, in that order, trimmed.
    ///
    /// This is the text a custom raw-execute command reports as its payload.
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text.trim_end().to_string()
    }
}

// ── Capability trait ──────────────────────────────────────────────────────────

/// The side-effect capabilities the executor requires from the host.
///
/// The shipping implementation is `infrastructure::system::shell`, which
/// maps each capability onto platform tools.  Tests use the recording mock.
#[async_trait]
pub trait SystemActions: Send + Sync {
    /// The platform the process runs on, cached once at construction.
    fn platform(&self) -> Platform;

    /// Injects a single key tap with the given modifier keys held.
    ///
    /// Key and modifier names use the vocabulary in `pilot_core::keys`.
    fn send_keystroke(&self, key: &str, modifiers: &[String]) -> Result<(), ActionError>;

    /// Types literal text as keyboard input.
    fn type_text(&self, text: &str) -> Result<(), ActionError>;

    /// Runs a command line to completion and captures its output.
    ///
    /// # Errors
    ///
    /// [`ActionError::ProcessFailed`] on a non-zero exit status (carrying
    /// the combined output), [`ActionError::Invocation`] when the process
    /// cannot be spawned at all.
    async fn run_process(&self, command_line: &str) -> Result<ProcessOutput, ActionError>;

    /// Opens a URL with the OS default handler (browser, mail client, ...).
    fn open_external(&self, url: &str) -> Result<(), ActionError>;

    /// Opens a filesystem path with the OS default opener.
    fn open_path(&self, path: &str) -> Result<(), ActionError>;

    /// Persists a dictated note (external collaborator; a thin disk wrapper).
    fn save_note(&self, text: &str) -> Result<(), ActionError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
