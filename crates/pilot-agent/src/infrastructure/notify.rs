//! Desktop notification delivery.
//!
//! Notifications are best-effort: a machine without a notification daemon
//! still logs the message, and delivery failures never disturb the session.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use pilot_core::Platform;

use crate::application::session::Notifier;

/// Shows messages through the platform's notification tooling, falling back
/// to the log when none is available.
pub struct DesktopNotifier {
    platform: Platform,
}

impl DesktopNotifier {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn spawn_notifier(&self, message: &str) -> std::io::Result<()> {
        let mut command = match self.platform {
            Platform::Linux => {
                let mut c = std::process::Command::new("notify-send");
                c.arg("DeskPilot").arg(message);
                c
            }
            Platform::Darwin => {
                let mut c = std::process::Command::new("osascript");
                c.arg("-e").arg(format!(
                    "display notification {} with title \"DeskPilot\"",
                    applescript_quote(message)
                ));
                c
            }
            Platform::Windows => {
                let mut c = std::process::Command::new("msg");
                c.arg("*").arg(message);
                c
            }
        };
        command.spawn().map(|_| ())
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, message: &str) {
        info!("notification: {message}");
        if let Err(e) = self.spawn_notifier(message) {
            debug!("notification tooling unavailable: {e}");
        }
    }
}

fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Collects messages in memory for test assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_quote_escapes_quotes() {
        assert_eq!(applescript_quote(r#"say "hi""#), r#""say \"hi\"""#);
    }
}
