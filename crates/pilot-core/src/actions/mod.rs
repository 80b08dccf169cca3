//! Platform Action Registry: abstract system actions to OS invocations.
//!
//! Maps the power-management actions a controller can request onto the
//! command line each platform actually understands, and normalizes the
//! controller-supplied timeout into the platform's native unit.
//!
//! # Why normalization is non-symmetric
//!
//! The two shutdown commands disagree about units:
//!
//! - Linux `shutdown -h N` takes **minutes**.
//! - Windows `shutdown /s /t N` takes **seconds**.
//!
//! A controller phrase like "turn off in 120 seconds" therefore becomes
//! `shutdown -h 2` on Linux but `shutdown /s /t 120` on Windows.  A platform
//! with no defined conversion passes the raw value through unchanged.
//!
//! # The minimum-1 clamp
//!
//! Converting 30 seconds to Linux minutes floors to 0, and `shutdown -h 0`
//! fires immediately (or is rejected outright by some init systems).  Every
//! normalized value is clamped to a minimum of 1 so a sub-unit request is
//! delayed slightly rather than silently dropped.
//!
//! # The Darwin gap
//!
//! There is no implemented macOS mapping.  [`resolve`] returns `None` there,
//! which callers surface as an explicit "unsupported on this platform"
//! outcome — never a panic, never a guessed command line.

use crate::domain::device::Platform;

// ── Action and unit enums ─────────────────────────────────────────────────────

/// The abstract power-management actions the registry can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAction {
    /// Power the machine off after the timeout.
    TurnOff,
    /// Restart the machine after the timeout.
    Reboot,
    /// Abort a previously scheduled shutdown/reboot.  Ignores the timeout.
    Cancel,
}

/// The unit the controller expressed the timeout in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Parses the unit word from a command phrase (singular or plural).
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" => Some(TimeUnit::Seconds),
            "minute" | "minutes" => Some(TimeUnit::Minutes),
            "hour" | "hours" => Some(TimeUnit::Hours),
            _ => None,
        }
    }
}

// ── Timeout normalization ─────────────────────────────────────────────────────

/// Converts `timeout` expressed in `unit` into the platform's native unit.
///
/// Linux's native unit is minutes, Windows' is seconds.  Platforms with no
/// defined conversion (Darwin) pass the raw value through.  The result is
/// floor-clamped to a minimum of 1.
pub fn normalize_timeout(platform: Platform, timeout: u64, unit: TimeUnit) -> u64 {
    // Saturating: the timeout comes from a remote controller, so an absurd
    // value must clamp rather than overflow.
    let converted = match platform {
        Platform::Linux => match unit {
            TimeUnit::Seconds => timeout / 60,
            TimeUnit::Minutes => timeout,
            TimeUnit::Hours => timeout.saturating_mul(60),
        },
        Platform::Windows => match unit {
            TimeUnit::Seconds => timeout,
            TimeUnit::Minutes => timeout.saturating_mul(60),
            TimeUnit::Hours => timeout.saturating_mul(3600),
        },
        // No conversion defined: pass-through.
        Platform::Darwin => timeout,
    };

    converted.max(1)
}

// ── Invocation resolution ─────────────────────────────────────────────────────

/// Resolves an action to the invocation string for `platform`.
///
/// Returns `None` when the platform has no implemented mapping (Darwin).
/// `Cancel` ignores `timeout` and `unit` entirely.
pub fn resolve(
    action: SystemAction,
    platform: Platform,
    timeout: u64,
    unit: TimeUnit,
) -> Option<String> {
    let t = normalize_timeout(platform, timeout, unit);

    match (platform, action) {
        (Platform::Linux, SystemAction::TurnOff) => Some(format!("shutdown -h {t}")),
        (Platform::Linux, SystemAction::Reboot) => Some(format!("shutdown -r {t}")),
        (Platform::Linux, SystemAction::Cancel) => Some("shutdown -c".to_string()),

        (Platform::Windows, SystemAction::TurnOff) => Some(format!("shutdown /s /t {t}")),
        (Platform::Windows, SystemAction::Reboot) => Some(format!("shutdown /r /t {t}")),
        (Platform::Windows, SystemAction::Cancel) => Some("shutdown /a".to_string()),

        (Platform::Darwin, _) => None,
    }
}

// ── Untimed actions ───────────────────────────────────────────────────────────

/// Invocation for toggling the master audio mute, or `None` where no mapping
/// is implemented (Darwin).
pub fn mute_invocation(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Linux => Some("amixer -q -D pulse sset Master toggle"),
        Platform::Windows => {
            // SendKeys character 173 is the virtual volume-mute key.
            Some(r#"powershell -c "(New-Object -ComObject WScript.Shell).SendKeys([char]173)""#)
        }
        Platform::Darwin => None,
    }
}

/// Invocation for locking the current desktop session, or `None` where no
/// mapping is implemented (Darwin).
pub fn lock_invocation(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Linux => Some("loginctl lock-session"),
        Platform::Windows => Some("rundll32.exe user32.dll,LockWorkStation"),
        Platform::Darwin => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
