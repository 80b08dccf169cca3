//! Device identity: the stable description of the controlled machine.
//!
//! A [`Device`] is created once at process start and never mutated for the
//! process lifetime.  Its `id` is an opaque stable identifier (the agent
//! derives it from the machine id where available); the relay uses it to
//! address messages and the controller uses it to recognise the device.

use serde::{Deserialize, Serialize};

// ── Platform ──────────────────────────────────────────────────────────────────

/// The operating system family of a device.
///
/// Serialized with the OS-type spelling the relay protocol has always used
/// (`"Linux"`, `"Windows_NT"`, `"Darwin"`), matching what controllers expect
/// in the device registration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Linux")]
    Linux,
    #[serde(rename = "Windows_NT")]
    Windows,
    #[serde(rename = "Darwin")]
    Darwin,
}

impl Platform {
    /// Returns the platform this binary was compiled for.
    ///
    /// Resolved at compile time via `cfg!`; there is no runtime detection
    /// and therefore no way for the value to change mid-process.  Targets
    /// other than the three desktop families fall back to [`Platform::Linux`]
    /// behaviour (the closest Unix-like action set).
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    /// The name of the "meta" modifier key on this platform.
    ///
    /// Used when a controller phrase says `windows` (or `cmd`/`meta`): the
    /// token is rewritten to the key name the local injection layer knows.
    pub fn meta_key(self) -> &'static str {
        match self {
            Platform::Linux => "super",
            Platform::Windows => "win",
            Platform::Darwin => "command",
        }
    }

    /// Wire spelling of the platform (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows_NT",
            Platform::Darwin => "Darwin",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Device ────────────────────────────────────────────────────────────────────

/// Identity of the controlled device.
///
/// Immutable for the process lifetime.  The `id` is opaque to everything in
/// this crate; the agent derives a stable one at startup (machine id when
/// available, otherwise a fresh UUID that lives as long as the process).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque stable identifier used as the `source` of relay messages.
    pub id: String,
    /// Human-readable name shown to controllers (usually the hostname).
    pub name: String,
    /// OS family, reported to the relay at registration.
    #[serde(rename = "type")]
    pub platform: Platform,
}

impl Device {
    /// Creates a device identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serializes_with_os_type_spelling() {
        // The relay has always used Node's os.type() spellings; the serde
        // rename attributes must preserve them exactly.
        assert_eq!(serde_json::to_string(&Platform::Linux).unwrap(), r#""Linux""#);
        assert_eq!(
            serde_json::to_string(&Platform::Windows).unwrap(),
            r#""Windows_NT""#
        );
        assert_eq!(
            serde_json::to_string(&Platform::Darwin).unwrap(),
            r#""Darwin""#
        );
    }

    #[test]
    fn test_platform_deserializes_from_os_type_spelling() {
        let p: Platform = serde_json::from_str(r#""Windows_NT""#).unwrap();
        assert_eq!(p, Platform::Windows);
    }

    #[test]
    fn test_meta_key_differs_per_platform() {
        assert_eq!(Platform::Linux.meta_key(), "super");
        assert_eq!(Platform::Windows.meta_key(), "win");
        assert_eq!(Platform::Darwin.meta_key(), "command");
    }

    #[test]
    fn test_device_serializes_platform_under_type_field() {
        let device = Device::new("abc123", "workstation", Platform::Linux);
        let json = serde_json::to_string(&device).unwrap();
        assert!(json.contains(r#""type":"Linux""#));
        assert!(json.contains(r#""id":"abc123""#));
        assert!(json.contains(r#""name":"workstation""#));
    }

    #[test]
    fn test_display_matches_wire_spelling() {
        assert_eq!(Platform::Darwin.to_string(), "Darwin");
    }
}
