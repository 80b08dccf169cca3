//! Mock desktop capability provider for unit testing.
//!
//! The real [`ShellSystemActions`](super::shell::ShellSystemActions) shells
//! out to `xdotool`, PowerShell, or `osascript`, which:
//!
//! - Require a physical desktop environment to run.
//! - Actually press keys or open windows on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! `MockSystemActions` replaces all of that with in-memory recording.  Each
//! call is pushed into a `Mutex<Vec<...>>` so test assertions can inspect
//! exactly what a command exercised and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let mock = Arc::new(MockSystemActions::new(Platform::Linux));
//! let executor = CommandExecutor::new(Arc::clone(&mock) as Arc<dyn SystemActions>);
//!
//! executor.execute_command("close", &[]).await;
//!
//! let keys = mock.keystrokes.lock().unwrap();
//! assert_eq!(keys[0], ("f4".to_string(), vec!["alt".to_string()]));
//! ```
//!
//! # Simulating failures
//!
//! Call [`fail_processes`](MockSystemActions::fail_processes) or
//! [`fail_all`](MockSystemActions::fail_all) before driving the code under
//! test to exercise the error-handling paths without a broken OS.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use pilot_core::Platform;

use crate::application::actions::{ActionError, ProcessOutput, SystemActions};

/// A mock capability provider that records all calls without touching the OS.
///
/// Record fields are `Mutex<Vec<...>>` so tests can share the mock across
/// tasks behind an `Arc`.
pub struct MockSystemActions {
    platform: Platform,
    /// Records each (key, modifiers) pair passed to `send_keystroke`.
    pub keystrokes: Mutex<Vec<(String, Vec<String>)>>,
    /// Records each text passed to `type_text`.
    pub typed: Mutex<Vec<String>>,
    /// Records each command line passed to `run_process`.
    pub processes: Mutex<Vec<String>>,
    /// Records each URL passed to `open_external`.
    pub opened_urls: Mutex<Vec<String>>,
    /// Records each path passed to `open_path`.
    pub opened_paths: Mutex<Vec<String>>,
    /// Records each note body passed to `save_note`.
    pub notes: Mutex<Vec<String>>,
    /// Stdout to return from queued `run_process` calls, oldest first.
    /// An empty queue yields empty output.
    pub process_outputs: Mutex<VecDeque<String>>,
    hold: Mutex<Option<Arc<Semaphore>>>,
    fail_processes: AtomicBool,
    fail_all: AtomicBool,
}

impl MockSystemActions {
    /// Creates a mock reporting `platform`, with empty records and no
    /// configured failures.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            keystrokes: Mutex::new(Vec::new()),
            typed: Mutex::new(Vec::new()),
            processes: Mutex::new(Vec::new()),
            opened_urls: Mutex::new(Vec::new()),
            opened_paths: Mutex::new(Vec::new()),
            notes: Mutex::new(Vec::new()),
            process_outputs: Mutex::new(VecDeque::new()),
            hold: Mutex::new(None),
            fail_processes: AtomicBool::new(false),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `run_process` call fail.
    pub fn fail_processes(&self) {
        self.fail_processes.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent capability call fail.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Parks subsequent `run_process` calls on the returned gate.  Each
    /// permit added releases one parked call; the command line is recorded
    /// before parking, so tests can poll [`processes`](Self::processes) to
    /// know an execution is in flight.
    pub fn hold_processes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.hold.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Queues stdout for the next `run_process` call.
    pub fn set_process_output(&self, stdout: &str) {
        self.process_outputs
            .lock()
            .unwrap()
            .push_back(stdout.to_string());
    }

    fn gate(&self) -> Result<(), ActionError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(ActionError::Invocation("mock failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SystemActions for MockSystemActions {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn send_keystroke(&self, key: &str, modifiers: &[String]) -> Result<(), ActionError> {
        self.gate()?;
        self.keystrokes
            .lock()
            .unwrap()
            .push((key.to_string(), modifiers.to_vec()));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), ActionError> {
        self.gate()?;
        self.typed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn run_process(&self, command_line: &str) -> Result<ProcessOutput, ActionError> {
        self.gate()?;
        if self.fail_processes.load(Ordering::SeqCst) {
            return Err(ActionError::ProcessFailed {
                status: 1,
                output: "mock process failure".into(),
            });
        }
        self.processes.lock().unwrap().push(command_line.to_string());
        let hold = self.hold.lock().unwrap().clone();
        if let Some(hold) = hold {
            if let Ok(permit) = hold.acquire().await {
                permit.forget();
            }
        }
        let stdout = self
            .process_outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(ProcessOutput {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        })
    }

    fn open_external(&self, url: &str) -> Result<(), ActionError> {
        self.gate()?;
        self.opened_urls.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn open_path(&self, path: &str) -> Result<(), ActionError> {
        self.gate()?;
        self.opened_paths.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn save_note(&self, text: &str) -> Result<(), ActionError> {
        self.gate()?;
        self.notes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
