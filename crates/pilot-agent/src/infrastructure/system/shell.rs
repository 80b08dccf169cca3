//! Shell-backed desktop capability provider.
//!
//! Keystroke injection and text typing go through each platform's own
//! tooling: `xdotool` on Linux, `SendKeys` via PowerShell on Windows,
//! `osascript` on macOS.  Process execution runs through the platform
//! shell so command lines behave the way a user typing them would expect.
//!
//! Injection calls are fire-and-forget: the spawned tool finishes on its
//! own and a failed spawn is the only error the caller sees.  Process
//! execution is fully awaited because its output is the command's payload.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use pilot_core::Platform;

use crate::application::actions::{ActionError, ProcessOutput, SystemActions};

/// Production capability provider for the local desktop.
pub struct ShellSystemActions {
    platform: Platform,
}

impl ShellSystemActions {
    /// Provider for the platform this process runs on.
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }

    /// Provider for an explicit platform.  Used by tests that exercise the
    /// command builders without spawning anything.
    pub fn with_platform(platform: Platform) -> Self {
        Self { platform }
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<(), ActionError> {
        debug!("spawning {program} {args:?}");
        std::process::Command::new(program)
            .args(args)
            .spawn()
            .map(|_| ())
            .map_err(|e| ActionError::Invocation(format!("{program}: {e}")))
    }

    fn notes_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("deskpilot-notes.txt")
    }
}

impl Default for ShellSystemActions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemActions for ShellSystemActions {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn send_keystroke(&self, key: &str, modifiers: &[String]) -> Result<(), ActionError> {
        let (program, args) = keystroke_invocation(self.platform, key, modifiers)?;
        self.spawn(&program, &args)
    }

    fn type_text(&self, text: &str) -> Result<(), ActionError> {
        let (program, args) = typing_invocation(self.platform, text);
        self.spawn(&program, &args)
    }

    async fn run_process(&self, command_line: &str) -> Result<ProcessOutput, ActionError> {
        let mut command = match self.platform {
            Platform::Windows => {
                let mut c = tokio::process::Command::new("cmd");
                c.arg("/C").arg(command_line);
                c
            }
            _ => {
                let mut c = tokio::process::Command::new("sh");
                c.arg("-c").arg(command_line);
                c
            }
        };

        let output = command
            .output()
            .await
            .map_err(|e| ActionError::Invocation(format!("{command_line}: {e}")))?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        if !output.status.success() {
            return Err(ActionError::ProcessFailed {
                status: result.exit_code,
                output: result.combined(),
            });
        }
        Ok(result)
    }

    fn open_external(&self, url: &str) -> Result<(), ActionError> {
        match self.platform {
            Platform::Linux => self.spawn("xdg-open", &[url.to_string()]),
            Platform::Darwin => self.spawn("open", &[url.to_string()]),
            Platform::Windows => self.spawn(
                "cmd",
                &["/C".into(), "start".into(), String::new(), url.to_string()],
            ),
        }
    }

    fn open_path(&self, path: &str) -> Result<(), ActionError> {
        // The default openers treat files and URLs uniformly.
        self.open_external(path)
    }

    fn save_note(&self, text: &str) -> Result<(), ActionError> {
        use std::io::Write;

        let path = Self::notes_path();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ActionError::Invocation(format!("{}: {e}", path.display())))?;
        writeln!(file, "{text}").map_err(|e| ActionError::Invocation(e.to_string()))?;
        Ok(())
    }
}

// ── Keystroke builders ────────────────────────────────────────────────────────

/// Builds the (program, args) pair that injects one key chord.
fn keystroke_invocation(
    platform: Platform,
    key: &str,
    modifiers: &[String],
) -> Result<(String, Vec<String>), ActionError> {
    match platform {
        Platform::Linux => {
            let mut chord: Vec<&str> = modifiers.iter().map(|m| linux_modifier(m)).collect();
            let keysym = linux_keysym(key);
            chord.push(&keysym);
            Ok(("xdotool".into(), vec!["key".into(), chord.join("+")]))
        }
        Platform::Windows => {
            let mut sequence = String::new();
            for modifier in modifiers {
                sequence.push_str(windows_modifier(modifier)?);
            }
            sequence.push_str(&windows_key(key));
            let script = format!(
                "(New-Object -ComObject WScript.Shell).SendKeys('{}')",
                sequence.replace('\'', "''")
            );
            Ok(("powershell".into(), vec!["-NoProfile".into(), "-Command".into(), script]))
        }
        Platform::Darwin => {
            let script = darwin_keystroke_script(key, modifiers)?;
            Ok(("osascript".into(), vec!["-e".into(), script]))
        }
    }
}

/// Builds the (program, args) pair that types literal text.
fn typing_invocation(platform: Platform, text: &str) -> (String, Vec<String>) {
    match platform {
        Platform::Linux => (
            "xdotool".into(),
            vec!["type".into(), "--".into(), text.to_string()],
        ),
        Platform::Windows => {
            let script = format!(
                "(New-Object -ComObject WScript.Shell).SendKeys('{}')",
                sendkeys_escape(text).replace('\'', "''")
            );
            ("powershell".into(), vec!["-NoProfile".into(), "-Command".into(), script])
        }
        Platform::Darwin => {
            let quoted = text.replace('\\', "\\\\").replace('"', "\\\"");
            let script = format!("tell application \"System Events\" to keystroke \"{quoted}\"");
            ("osascript".into(), vec!["-e".into(), script])
        }
    }
}

fn linux_modifier(modifier: &str) -> &'static str {
    match modifier {
        "ctrl" | "control" => "ctrl",
        "alt" => "alt",
        "shift" => "shift",
        // The meta synonyms all land on Super under X11.
        _ => "super",
    }
}

fn linux_keysym(key: &str) -> String {
    match key {
        "enter" | "return" => "Return".into(),
        "tab" => "Tab".into(),
        "space" => "space".into(),
        "escape" | "esc" => "Escape".into(),
        "backspace" => "BackSpace".into(),
        "delete" => "Delete".into(),
        "insert" => "Insert".into(),
        "home" => "Home".into(),
        "end" => "End".into(),
        "pageup" => "Page_Up".into(),
        "pagedown" => "Page_Down".into(),
        "up" => "Up".into(),
        "down" => "Down".into(),
        "left" => "Left".into(),
        "right" => "Right".into(),
        "printscreen" => "Print".into(),
        "audio_mute" => "XF86AudioMute".into(),
        "audio_vol_up" => "XF86AudioRaiseVolume".into(),
        "audio_vol_down" => "XF86AudioLowerVolume".into(),
        "audio_play" => "XF86AudioPlay".into(),
        "super" | "win" | "command" => "super".into(),
        k if k.starts_with('f') && k[1..].parse::<u8>().is_ok() => k.to_uppercase(),
        other => other.to_string(),
    }
}

fn windows_modifier(modifier: &str) -> Result<&'static str, ActionError> {
    match modifier {
        "ctrl" | "control" => Ok("^"),
        "alt" => Ok("%"),
        "shift" => Ok("+"),
        // SendKeys has no token for the Windows key.
        "win" | "super" | "command" => Err(ActionError::Invocation(
            "the win modifier cannot be injected on this platform".into(),
        )),
        other => Err(ActionError::Invocation(format!("unknown modifier '{other}'"))),
    }
}

fn windows_key(key: &str) -> String {
    match key {
        "enter" | "return" => "{ENTER}".into(),
        "tab" => "{TAB}".into(),
        "space" => " ".into(),
        "escape" | "esc" => "{ESC}".into(),
        "backspace" => "{BACKSPACE}".into(),
        "delete" => "{DEL}".into(),
        "insert" => "{INS}".into(),
        "home" => "{HOME}".into(),
        "end" => "{END}".into(),
        "pageup" => "{PGUP}".into(),
        "pagedown" => "{PGDN}".into(),
        "up" => "{UP}".into(),
        "down" => "{DOWN}".into(),
        "left" => "{LEFT}".into(),
        "right" => "{RIGHT}".into(),
        "printscreen" => "{PRTSC}".into(),
        // The bare Windows key opens the start menu / search.
        "win" | "super" => "^{ESC}".into(),
        k if k.starts_with('f') && k[1..].parse::<u8>().is_ok() => {
            format!("{{{}}}", k.to_uppercase())
        }
        other => sendkeys_escape(other),
    }
}

/// Escapes SendKeys metacharacters in literal text.
fn sendkeys_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '+' | '^' | '%' | '~' | '(' | ')' | '{' | '}' | '[' | ']' => {
                escaped.push('{');
                escaped.push(c);
                escaped.push('}');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

fn darwin_keystroke_script(key: &str, modifiers: &[String]) -> Result<String, ActionError> {
    let using = if modifiers.is_empty() {
        String::new()
    } else {
        let downs: Vec<String> = modifiers
            .iter()
            .map(|m| format!("{} down", darwin_modifier(m)))
            .collect();
        format!(" using {{{}}}", downs.join(", "))
    };

    // Single characters go through `keystroke`; named keys need key codes.
    if key.chars().count() == 1 {
        let quoted = key.replace('\\', "\\\\").replace('"', "\\\"");
        return Ok(format!(
            "tell application \"System Events\" to keystroke \"{quoted}\"{using}"
        ));
    }
    let code = darwin_key_code(key).ok_or_else(|| {
        ActionError::Invocation(format!("no key code for '{key}' on this platform"))
    })?;
    Ok(format!(
        "tell application \"System Events\" to key code {code}{using}"
    ))
}

fn darwin_modifier(modifier: &str) -> &'static str {
    match modifier {
        "ctrl" | "control" => "control",
        "alt" => "option",
        "shift" => "shift",
        _ => "command",
    }
}

fn darwin_key_code(key: &str) -> Option<u8> {
    let code = match key {
        "enter" | "return" => 36,
        "tab" => 48,
        "space" => 49,
        "escape" | "esc" => 53,
        "backspace" => 51,
        "delete" => 117,
        "home" => 115,
        "end" => 119,
        "pageup" => 116,
        "pagedown" => 121,
        "left" => 123,
        "right" => 124,
        "down" => 125,
        "up" => 126,
        "f1" => 122,
        "f2" => 120,
        "f3" => 99,
        "f4" => 118,
        "f5" => 96,
        "f6" => 97,
        "f7" => 98,
        "f8" => 100,
        "f9" => 101,
        "f10" => 109,
        "f11" => 103,
        "f12" => 111,
        _ => return None,
    };
    Some(code)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_chord_joins_modifiers_and_keysym() {
        let (program, args) =
            keystroke_invocation(Platform::Linux, "t", &["ctrl".into(), "shift".into()]).unwrap();
        assert_eq!(program, "xdotool");
        assert_eq!(args, vec!["key".to_string(), "ctrl+shift+t".to_string()]);
    }

    #[test]
    fn test_linux_named_keys_map_to_keysyms() {
        assert_eq!(linux_keysym("enter"), "Return");
        assert_eq!(linux_keysym("pageup"), "Page_Up");
        assert_eq!(linux_keysym("audio_mute"), "XF86AudioMute");
        assert_eq!(linux_keysym("f4"), "F4");
        assert_eq!(linux_keysym("a"), "a");
    }

    #[test]
    fn test_windows_chord_uses_sendkeys_prefixes() {
        let (program, args) =
            keystroke_invocation(Platform::Windows, "f4", &["alt".into()]).unwrap();
        assert_eq!(program, "powershell");
        assert!(args[2].contains("%{F4}"), "unexpected script: {}", args[2]);
    }

    #[test]
    fn test_windows_win_modifier_is_rejected() {
        let result = keystroke_invocation(Platform::Windows, "l", &["win".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sendkeys_escape_wraps_metacharacters() {
        assert_eq!(sendkeys_escape("50%+5"), "50{%}{+}5");
        assert_eq!(sendkeys_escape("plain"), "plain");
    }

    #[test]
    fn test_darwin_named_key_uses_key_code() {
        let script = darwin_keystroke_script("enter", &[]).unwrap();
        assert!(script.contains("key code 36"), "{script}");
    }

    #[test]
    fn test_darwin_char_key_with_modifiers() {
        let script = darwin_keystroke_script("l", &["command".into()]).unwrap();
        assert!(script.contains("keystroke \"l\" using {command down}"), "{script}");
    }

    #[test]
    fn test_darwin_unknown_named_key_is_an_error() {
        assert!(darwin_keystroke_script("audio_play", &[]).is_err());
    }

    #[test]
    fn test_typing_on_linux_passes_text_verbatim() {
        let (program, args) = typing_invocation(Platform::Linux, "hello -- world");
        assert_eq!(program, "xdotool");
        assert_eq!(args, vec!["type".to_string(), "--".to_string(), "hello -- world".to_string()]);
    }
}
