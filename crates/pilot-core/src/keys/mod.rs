//! Key-name tables and catch-all phrase parsing.
//!
//! The last binding in the matcher's list accepts *any* remaining text and
//! tries to interpret it as a literal key combination: `ctrl shift t`,
//! `alt+f4`, `windows e`.  This module owns the vocabulary for that — which
//! names are modifiers, which are keys — and the normalization rules:
//!
//! 1. Lower-case the phrase.
//! 2. Collapse runs of whitespace to single separators.
//! 3. Substitute platform synonyms: `windows` / `meta` / `cmd` / `command`
//!    become the meta-modifier name the local injection layer uses
//!    (`super` on Linux, `win` on Windows, `command` on macOS).
//! 4. The final token is the key; everything before it must be a modifier.
//!
//! Unknown names are an error, which the matcher surfaces as an execution
//! `Failure` — the catch-all guarantees a *match*, not a successful chord.

use thiserror::Error;

use crate::domain::device::Platform;

// ── Vocabulary tables ─────────────────────────────────────────────────────────

/// Modifier key names accepted in a chord prefix.
///
/// `super`, `win`, and `command` are the per-platform meta names; synonym
/// substitution happens before this table is consulted.
const MODIFIERS: &[&str] = &["ctrl", "control", "alt", "shift", "super", "win", "command"];

/// Non-letter, non-digit key names the injection layer understands.
///
/// The vocabulary controllers write chords in; every entry has a mapping
/// in at least one platform's injection backend.
const NAMED_KEYS: &[&str] = &[
    "enter", "return", "tab", "space", "escape", "esc", "backspace", "delete", "insert", "home",
    "end", "pageup", "pagedown", "up", "down", "left", "right", "printscreen", "audio_mute",
    "audio_vol_up", "audio_vol_down", "audio_play", "f1", "f2", "f3", "f4", "f5", "f6", "f7",
    "f8", "f9", "f10", "f11", "f12",
];

/// Returns `true` if `name` is an accepted modifier token.
pub fn is_modifier(name: &str) -> bool {
    MODIFIERS.contains(&name)
}

/// Returns `true` if `name` is a key the injection layer can tap.
pub fn is_key_name(name: &str) -> bool {
    let single_letter = name.len() == 1 && name.chars().all(|c| c.is_ascii_alphanumeric());
    single_letter || NAMED_KEYS.contains(&name) || is_modifier(name)
}

// ── Parse error ───────────────────────────────────────────────────────────────

/// Why a phrase could not be interpreted as a key chord.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key phrase")]
    Empty,

    /// The final token is not a known key name.
    #[error("'{0}' is not a valid key name")]
    UnknownKey(String),

    /// A token before the final one is not a known modifier.
    #[error("'{0}' is not a valid modifier key")]
    UnknownModifier(String),
}

// ── Key chord ─────────────────────────────────────────────────────────────────

/// A parsed key combination: one key plus zero or more modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// The key to tap (already lower-cased).
    pub key: String,
    /// Modifier keys held while tapping, in phrase order.
    pub modifiers: Vec<String>,
}

impl KeyChord {
    /// Parses a free-text phrase into a chord for `platform`.
    ///
    /// Tokens are separated by whitespace or `+`.  The phrase is normalized
    /// (lower-case, collapsed, synonyms substituted) before validation.
    ///
    /// # Errors
    ///
    /// [`KeyParseError::Empty`] for a blank phrase,
    /// [`KeyParseError::UnknownKey`] when the final token is not a key, and
    /// [`KeyParseError::UnknownModifier`] when a leading token is not a
    /// modifier.
    pub fn parse(phrase: &str, platform: Platform) -> Result<Self, KeyParseError> {
        let tokens: Vec<String> = phrase
            .to_ascii_lowercase()
            .split(|c: char| c.is_whitespace() || c == '+')
            .filter(|t| !t.is_empty())
            .map(|t| substitute_meta(t, platform))
            .collect();

        let (key, modifiers) = match tokens.split_last() {
            None => return Err(KeyParseError::Empty),
            Some((key, modifiers)) => (key.clone(), modifiers.to_vec()),
        };

        if !is_key_name(&key) {
            return Err(KeyParseError::UnknownKey(key));
        }
        if let Some(bad) = modifiers.iter().find(|m| !is_modifier(m)) {
            return Err(KeyParseError::UnknownModifier(bad.clone()));
        }

        Ok(Self { key, modifiers })
    }
}

/// Rewrites meta-key synonyms to the platform's modifier name.
fn substitute_meta(token: &str, platform: Platform) -> String {
    match token {
        "windows" | "meta" | "cmd" | "command" => platform.meta_key().to_string(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_key_parses_without_modifiers() {
        let chord = KeyChord::parse("enter", Platform::Linux).unwrap();
        assert_eq!(chord.key, "enter");
        assert!(chord.modifiers.is_empty());
    }

    #[test]
    fn test_phrase_is_lower_cased_and_whitespace_collapsed() {
        let chord = KeyChord::parse("  Ctrl   Shift    T ", Platform::Linux).unwrap();
        assert_eq!(chord.key, "t");
        assert_eq!(chord.modifiers, vec!["ctrl", "shift"]);
    }

    #[test]
    fn test_plus_separator_is_accepted() {
        let chord = KeyChord::parse("alt+f4", Platform::Windows).unwrap();
        assert_eq!(chord.key, "f4");
        assert_eq!(chord.modifiers, vec!["alt"]);
    }

    #[test]
    fn test_windows_synonym_substitutes_per_platform() {
        let linux = KeyChord::parse("windows e", Platform::Linux).unwrap();
        assert_eq!(linux.modifiers, vec!["super"]);

        let windows = KeyChord::parse("windows e", Platform::Windows).unwrap();
        assert_eq!(windows.modifiers, vec!["win"]);

        let mac = KeyChord::parse("cmd e", Platform::Darwin).unwrap();
        assert_eq!(mac.modifiers, vec!["command"]);
    }

    #[test]
    fn test_meta_synonym_as_final_token_becomes_the_key() {
        // A bare "windows" phrase taps the meta key itself.
        let chord = KeyChord::parse("windows", Platform::Linux).unwrap();
        assert_eq!(chord.key, "super");
        assert!(chord.modifiers.is_empty());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = KeyChord::parse("asdkfj", Platform::Linux).unwrap_err();
        assert_eq!(err, KeyParseError::UnknownKey("asdkfj".to_string()));
    }

    #[test]
    fn test_unknown_modifier_is_an_error() {
        let err = KeyChord::parse("banana t", Platform::Linux).unwrap_err();
        assert_eq!(err, KeyParseError::UnknownModifier("banana".to_string()));
    }

    #[test]
    fn test_empty_phrase_is_an_error() {
        assert_eq!(KeyChord::parse("   ", Platform::Linux), Err(KeyParseError::Empty));
    }

    #[test]
    fn test_letters_digits_and_function_keys_are_keys() {
        assert!(is_key_name("a"));
        assert!(is_key_name("7"));
        assert!(is_key_name("f12"));
        assert!(is_key_name("audio_mute"));
        assert!(!is_key_name("notakey"));
    }
}
