//! The ordered command table: pattern → binding records, first match wins.
//!
//! The priority list is an explicit ordered list of tagged records
//! evaluated in a fixed loop: each [`CommandBinding`] pairs a compiled
//! case-insensitive pattern with a [`BindingKind`] tag, and the executor
//! interprets the tag.  The list is built once and never mutated at
//! runtime.
//!
//! # Order is the contract
//!
//! More specific patterns must be registered before looser ones; overlap is
//! resolved purely by list position, never by specificity scoring.  The note
//! suffix (`... save this note`) therefore sits at the very top — any
//! wildcard binding below it would otherwise swallow the sentence — and the
//! key-chord catch-all sits last, accepting whatever remains.  With the
//! catch-all installed the table never reports "no match" for non-empty
//! input.
//!
//! # Custom commands pre-empt everything
//!
//! A user-authored [`CustomCommand`] whose phrase equals the input
//! (case-insensitively, exact) short-circuits the built-in scan entirely.

use std::collections::HashMap;

use regex::Regex;

use pilot_core::{CustomCommand, Platform};

// ── Binding records ───────────────────────────────────────────────────────────

/// What a matched binding means; the executor dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `<text> save this note` — persist a dictated note.
    SaveNote,
    /// `browse <resource>` — open `https://<resource>/` in the browser.
    Browse,
    /// `type <text>` — type the text as keyboard input.
    Type,
    /// `search <query>` — open the system search and type the query.
    Search,
    /// `close` — Alt+F4 the focused window.
    Close,
    /// `log out` / `logout` — meta+L.
    LogOut,
    /// `lock` — lock the desktop session.
    Lock,
    /// `mute` — toggle master audio mute.
    Mute,
    /// `turn off|reboot|cancel [in <n> <unit>]` — power management.
    Power,
    /// Anything else — interpret the text as a literal key combination.
    KeyChord,
}

/// One pattern→binding record in the ordered table.
#[derive(Debug)]
pub struct CommandBinding {
    pub pattern: Regex,
    pub kind: BindingKind,
}

/// Per-invocation match context: named capture groups plus the platform.
///
/// Constructed fresh for every lookup; never shared between invocations.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub captures: HashMap<String, String>,
    pub platform: Platform,
}

impl MatchContext {
    /// Returns the named capture group, or an empty string when absent.
    ///
    /// Optional groups (like the power timeout) simply don't capture; the
    /// handlers treat absence as "use the default".
    pub fn group(&self, name: &str) -> &str {
        self.captures.get(name).map(String::as_str).unwrap_or("")
    }
}

// ── Lookup result ─────────────────────────────────────────────────────────────

/// Outcome of a table lookup.
#[derive(Debug)]
pub enum Match<'a> {
    /// A built-in binding matched; `context` holds its capture groups.
    Builtin {
        binding: &'a CommandBinding,
        context: MatchContext,
    },
    /// A custom command phrase matched exactly (pre-empting built-ins).
    Custom(&'a CustomCommand),
    /// Nothing matched.  Only reachable for input the catch-all rejects
    /// structurally (effectively: empty input).
    NotFound,
}

// ── The table ─────────────────────────────────────────────────────────────────

/// The immutable, ordered command table.
pub struct CommandTable {
    bindings: Vec<CommandBinding>,
}

impl CommandTable {
    /// Builds the default built-in table, catch-all included.
    ///
    /// The registration order below *is* the priority order.
    pub fn builtin() -> Self {
        Self {
            bindings: vec![
                // Note suffix first: every wildcard below would swallow it.
                binding(BindingKind::SaveNote, r"^(?P<text>.+?),? save this note$"),
                binding(BindingKind::Browse, r"^browse (?P<resource>.+)$"),
                binding(BindingKind::Type, r"^type (?P<text>.+)$"),
                binding(BindingKind::Search, r"^search (?P<query>.+)$"),
                binding(BindingKind::Close, r"^close$"),
                binding(BindingKind::LogOut, r"^log ?out$"),
                binding(BindingKind::Lock, r"^lock$"),
                binding(BindingKind::Mute, r"^mute$"),
                binding(
                    BindingKind::Power,
                    r"^(?P<action>turn off|reboot|cancel)(?: in (?P<timeout>\d+) (?P<unit>seconds?|minutes?|hours?))?$",
                ),
                // Catch-all: any remaining text is a literal key combination.
                binding(BindingKind::KeyChord, r"^(?P<keys>.+)$"),
            ],
        }
    }

    /// Builds a table from explicit records (test seam for order properties).
    pub fn from_bindings(bindings: Vec<CommandBinding>) -> Self {
        Self { bindings }
    }

    /// Looks up `input`, checking custom commands before the built-in scan.
    pub fn lookup<'a>(
        &'a self,
        input: &str,
        custom_commands: &'a [CustomCommand],
        platform: Platform,
    ) -> Match<'a> {
        // Step 1: custom override — exact phrase, case-insensitive.
        if let Some(custom) = custom_commands.iter().find(|c| c.matches(input)) {
            return Match::Custom(custom);
        }

        // Step 2: fixed ordered scan, first pattern hit wins.
        for b in &self.bindings {
            if let Some(caps) = b.pattern.captures(input) {
                let mut captures = HashMap::new();
                for name in b.pattern.capture_names().flatten() {
                    if let Some(m) = caps.name(name) {
                        captures.insert(name.to_string(), m.as_str().to_string());
                    }
                }
                return Match::Builtin {
                    binding: b,
                    context: MatchContext { captures, platform },
                };
            }
        }

        Match::NotFound
    }
}

/// Compiles one case-insensitive binding record.
fn binding(kind: BindingKind, pattern: &str) -> CommandBinding {
    CommandBinding {
        // The patterns are compile-time constants; a failure here is a bug
        // in the table itself, caught by the constructor test below.
        pattern: Regex::new(&format!("(?i){pattern}")).expect("invalid built-in pattern"),
        kind,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CommandTable {
        CommandTable::builtin()
    }

    fn kind_of(m: Match<'_>) -> BindingKind {
        match m {
            Match::Builtin { binding, .. } => binding.kind,
            other => panic!("expected a built-in match, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_table_compiles() {
        assert!(!table().bindings.is_empty());
    }

    #[test]
    fn test_browse_matches_and_captures_resource() {
        let t = table();
        match t.lookup("browse example.com", &[], Platform::Linux) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::Browse);
                assert_eq!(context.group("resource"), "example.com");
                assert_eq!(context.platform, Platform::Linux);
            }
            other => panic!("expected Builtin, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let t = table();
        assert_eq!(
            kind_of(t.lookup("BROWSE Example.Com", &[], Platform::Linux)),
            BindingKind::Browse
        );
        assert_eq!(kind_of(t.lookup("MUTE", &[], Platform::Linux)), BindingKind::Mute);
    }

    #[test]
    fn test_first_match_wins_over_later_overlapping_binding() {
        // "type milk save this note" matches both the note suffix and the
        // `type` wildcard; the note suffix is registered first and must win.
        let t = table();
        match t.lookup("type milk save this note", &[], Platform::Linux) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::SaveNote);
                assert_eq!(context.group("text"), "type milk");
            }
            other => panic!("expected SaveNote, got {:?}", other),
        }
    }

    #[test]
    fn test_order_is_positional_not_specificity_scored() {
        // Two artificial overlapping bindings: the earlier, *looser* one
        // must still win, because position is the only tie-breaker.
        let t = CommandTable::from_bindings(vec![
            binding(BindingKind::Type, r"^do (?P<text>.+)$"),
            binding(BindingKind::Browse, r"^do something very specific$"),
        ]);
        assert_eq!(
            kind_of(t.lookup("do something very specific", &[], Platform::Linux)),
            BindingKind::Type
        );
    }

    #[test]
    fn test_note_suffix_with_optional_comma() {
        let t = table();
        match t.lookup("buy milk, save this note", &[], Platform::Linux) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::SaveNote);
                assert_eq!(context.group("text"), "buy milk");
            }
            other => panic!("expected SaveNote, got {:?}", other),
        }
    }

    #[test]
    fn test_power_captures_action_timeout_and_unit() {
        let t = table();
        match t.lookup("turn off in 2 minutes", &[], Platform::Linux) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::Power);
                assert_eq!(context.group("action"), "turn off");
                assert_eq!(context.group("timeout"), "2");
                assert_eq!(context.group("unit"), "minutes");
            }
            other => panic!("expected Power, got {:?}", other),
        }
    }

    #[test]
    fn test_power_timeout_clause_is_optional() {
        let t = table();
        match t.lookup("reboot", &[], Platform::Windows) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::Power);
                assert_eq!(context.group("action"), "reboot");
                // Absent optional groups read as empty.
                assert_eq!(context.group("timeout"), "");
            }
            other => panic!("expected Power, got {:?}", other),
        }
    }

    #[test]
    fn test_log_out_accepts_both_spellings() {
        let t = table();
        assert_eq!(kind_of(t.lookup("log out", &[], Platform::Linux)), BindingKind::LogOut);
        assert_eq!(kind_of(t.lookup("logout", &[], Platform::Linux)), BindingKind::LogOut);
    }

    #[test]
    fn test_unmatched_text_falls_through_to_key_chord() {
        let t = table();
        match t.lookup("ctrl shift t", &[], Platform::Linux) {
            Match::Builtin { binding, context } => {
                assert_eq!(binding.kind, BindingKind::KeyChord);
                assert_eq!(context.group("keys"), "ctrl shift t");
            }
            other => panic!("expected KeyChord, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_not_found() {
        let t = table();
        assert!(matches!(t.lookup("", &[], Platform::Linux), Match::NotFound));
    }

    #[test]
    fn test_custom_command_pre_empts_builtins() {
        // "mute" is a built-in, but an identical custom phrase must win.
        let customs = vec![CustomCommand {
            phrase: "Mute".to_string(),
            body: "echo custom".to_string(),
            default_manner: false,
        }];
        let t = table();
        match t.lookup("mute", &customs, Platform::Linux) {
            Match::Custom(c) => assert_eq!(c.body, "echo custom"),
            other => panic!("expected Custom, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_lookup_is_exact_not_pattern() {
        let customs = vec![CustomCommand {
            phrase: "open mail".to_string(),
            body: "https://mail.example.com".to_string(),
            default_manner: true,
        }];
        let t = table();
        // A superset phrase must not hit the custom command; it falls to the
        // catch-all instead.
        assert_eq!(
            kind_of(t.lookup("open mail please", &customs, Platform::Linux)),
            BindingKind::KeyChord
        );
    }
}
