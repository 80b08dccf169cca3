//! User-authored custom commands and the execution result union.

use serde::{Deserialize, Serialize};

// ── Custom commands ───────────────────────────────────────────────────────────

/// A user-defined phrase override.
///
/// Custom commands are authored on the controller, stored on the relay, and
/// loaded by the agent when a session starts.  They are compared against
/// incoming phrases by **exact, case-insensitive equality** — never by
/// pattern — and a hit pre-empts the entire built-in binding list.
///
/// # Execution modes
///
/// `default_manner` selects between the two bodies a user can write:
///
/// - `true` — `body` is a resource to open with the OS default handler.
///   It is tried as a URL first and falls back to a filesystem path.
/// - `false` — `body` is a raw system command; its combined output becomes
///   the success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommand {
    /// The exact phrase that triggers this command.
    pub phrase: String,
    /// URL/path to open, or a raw command line, depending on the mode.
    pub body: String,
    /// `true` = open with the OS default handler; `false` = execute.
    #[serde(rename = "defaultManner")]
    pub default_manner: bool,
}

impl CustomCommand {
    /// Returns `true` when `phrase` matches `input` case-insensitively.
    ///
    /// Exact equality only — custom commands never carry capture groups.
    pub fn matches(&self, input: &str) -> bool {
        self.phrase.eq_ignore_ascii_case(input)
    }
}

// ── Execution result ──────────────────────────────────────────────────────────

/// Outcome of interpreting and executing one phrase.
///
/// Exactly one side is ever present: a success carries the human-readable
/// payload echoed to the caller, a failure carries the underlying error
/// text.  Failures are terminal values, not propagated errors — every
/// capability fault is converted into `Failure` at the executor boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The phrase was recognised and its side effects were issued.
    Success {
        /// Short human-readable acknowledgement (e.g. `"Browsing resource..."`).
        payload: String,
    },
    /// The phrase was recognised but executing it failed.
    Failure {
        /// The underlying error text.  Shown locally only; the session layer
        /// never echoes it to the remote controller.
        error: String,
    },
}

impl ExecutionResult {
    /// Shorthand for a success with the given payload.
    pub fn success(payload: impl Into<String>) -> Self {
        Self::Success {
            payload: payload.into(),
        }
    }

    /// Shorthand for a failure with the given error text.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// `true` for the `Success` side.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_command_matches_case_insensitively() {
        let cmd = CustomCommand {
            phrase: "Open Mail".to_string(),
            body: "https://mail.example.com".to_string(),
            default_manner: true,
        };
        assert!(cmd.matches("open mail"));
        assert!(cmd.matches("OPEN MAIL"));
        assert!(cmd.matches("Open Mail"));
    }

    #[test]
    fn test_custom_command_requires_exact_phrase() {
        let cmd = CustomCommand {
            phrase: "open mail".to_string(),
            body: "x".to_string(),
            default_manner: true,
        };
        // Not a pattern: substrings and supersets must not match.
        assert!(!cmd.matches("open"));
        assert!(!cmd.matches("open mail now"));
        assert!(!cmd.matches(" open mail"));
    }

    #[test]
    fn test_custom_command_round_trips_default_manner_field_name() {
        // The relay stores the mode under "defaultManner"; the serde rename
        // must keep that spelling on the wire.
        let cmd = CustomCommand {
            phrase: "notes".to_string(),
            body: "/home/me/notes".to_string(),
            default_manner: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains(r#""defaultManner":false"#));
        let back: CustomCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_execution_result_exactly_one_side() {
        let ok = ExecutionResult::success("done");
        let bad = ExecutionResult::failure("boom");
        assert!(ok.is_success());
        assert!(!bad.is_success());
        match ok {
            ExecutionResult::Success { payload } => assert_eq!(payload, "done"),
            other => panic!("expected Success, got {:?}", other),
        }
        match bad {
            ExecutionResult::Failure { error } => assert_eq!(error, "boom"),
            other => panic!("expected Failure, got {:?}", other),
        }
    }
}
