//! Device identity detection.
//!
//! The relay keys everything off a stable device id.  On Linux the machine
//! id file gives an id that survives restarts; elsewhere (or when the file
//! is unreadable) a random UUID is generated per process.

use tracing::debug;
use uuid::Uuid;

use pilot_core::{Device, Platform};

/// Builds the [`Device`] this process registers as.
///
/// `name_override` comes from the CLI; without it the hostname is used, and
/// an anonymous fallback covers machines that expose neither.
pub fn detect_device(name_override: Option<String>) -> Device {
    let platform = Platform::current();
    let id = stable_id();
    let name = name_override
        .or_else(hostname)
        .unwrap_or_else(|| format!("device-{}", &id[..8.min(id.len())]));
    Device::new(id, name, platform)
}

fn stable_id() -> String {
    match std::fs::read_to_string("/etc/machine-id") {
        Ok(contents) => {
            let id = contents.trim();
            if !id.is_empty() {
                return id.to_string();
            }
            debug!("machine-id file is empty, generating a random id");
            Uuid::new_v4().to_string()
        }
        Err(e) => {
            debug!("no machine-id available ({e}), generating a random id");
            Uuid::new_v4().to_string()
        }
    }
}

fn hostname() -> Option<String> {
    for var in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    match std::fs::read_to_string("/etc/hostname") {
        Ok(contents) if !contents.trim().is_empty() => Some(contents.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_device_honors_name_override() {
        let device = detect_device(Some("study-pc".to_string()));
        assert_eq!(device.name, "study-pc");
        assert!(!device.id.is_empty());
    }

    #[test]
    fn test_detect_device_always_produces_a_name() {
        let device = detect_device(None);
        assert!(!device.name.is_empty());
    }
}
