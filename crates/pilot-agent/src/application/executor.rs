//! The command executor service: one phrase in, one `ExecutionResult` out.
//!
//! [`CommandExecutor`] holds the immutable binding table and an injected
//! [`SystemActions`] provider.  It is an explicit, constructible service —
//! there is no global singleton — so tests can hand it a recording mock and
//! observe exactly which capabilities a phrase exercised.
//!
//! # Error policy
//!
//! Every capability fault is recovered *here* and becomes
//! `ExecutionResult::Failure { error }`.  Nothing below this boundary
//! panics and nothing above it sees an `Err`: the session layer can always
//! treat the result as a plain value.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use pilot_core::actions::{self, SystemAction, TimeUnit};
use pilot_core::{CustomCommand, ExecutionResult, KeyChord};

use crate::application::actions::{ActionError, SystemActions};
use crate::application::matcher::{BindingKind, CommandTable, Match, MatchContext};

// ── The service ───────────────────────────────────────────────────────────────

/// Interprets phrases against the ordered table and runs the side effects.
pub struct CommandExecutor {
    table: CommandTable,
    system: Arc<dyn SystemActions>,
}

impl CommandExecutor {
    /// Creates an executor over the default built-in table.
    pub fn new(system: Arc<dyn SystemActions>) -> Self {
        Self {
            table: CommandTable::builtin(),
            system,
        }
    }

    /// The host-facing entry point: interpret and execute one phrase.
    ///
    /// Custom commands are checked first (exact, case-insensitive); the
    /// built-in scan runs otherwise.  Never returns `Err` and never panics —
    /// all failure modes are folded into the result.
    pub async fn execute_command(
        &self,
        body: &str,
        custom_commands: &[CustomCommand],
    ) -> ExecutionResult {
        let input = body.trim();
        debug!("executing phrase: {input:?}");

        match self.table.lookup(input, custom_commands, self.system.platform()) {
            Match::Custom(custom) => self.run_custom(custom).await,
            Match::Builtin { binding, context } => self.run_builtin(binding.kind, context).await,
            Match::NotFound => ExecutionResult::failure("Command not recognized"),
        }
    }

    // ── Built-in bindings ─────────────────────────────────────────────────────

    async fn run_builtin(&self, kind: BindingKind, ctx: MatchContext) -> ExecutionResult {
        match kind {
            BindingKind::Browse => {
                let resource = ctx.group("resource");
                match self.system.open_external(&format!("https://{resource}/")) {
                    Ok(()) => ExecutionResult::success("Browsing resource..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }

            BindingKind::Type => {
                let text = ctx.group("text");
                match self.system.type_text(text) {
                    Ok(()) => ExecutionResult::success(format!("Typing: {text}...")),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }

            BindingKind::Search => {
                // Open the system search with the meta key, then type the query.
                let query = ctx.group("query");
                let meta = ctx.platform.meta_key();
                let outcome = self
                    .system
                    .send_keystroke(meta, &[])
                    .and_then(|()| self.system.type_text(query));
                match outcome {
                    Ok(()) => ExecutionResult::success(format!("Searching: {query}...")),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }

            BindingKind::SaveNote => match self.system.save_note(ctx.group("text")) {
                Ok(()) => ExecutionResult::success("Saving note..."),
                Err(e) => ExecutionResult::failure(e.to_string()),
            },

            BindingKind::Close => {
                match self.system.send_keystroke("f4", &["alt".to_string()]) {
                    Ok(()) => ExecutionResult::success("Closing..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }

            BindingKind::LogOut => {
                let meta = ctx.platform.meta_key().to_string();
                match self.system.send_keystroke("l", &[meta]) {
                    Ok(()) => ExecutionResult::success("Logging out..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }

            BindingKind::Lock => match actions::lock_invocation(ctx.platform) {
                Some(call) => match self.system.run_process(call).await {
                    Ok(_) => ExecutionResult::success("Locking..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                },
                None => ExecutionResult::failure(ActionError::Unsupported.to_string()),
            },

            BindingKind::Mute => match actions::mute_invocation(ctx.platform) {
                Some(call) => match self.system.run_process(call).await {
                    Ok(_) => ExecutionResult::success("Muting..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                },
                None => ExecutionResult::failure(ActionError::Unsupported.to_string()),
            },

            BindingKind::Power => self.run_power(&ctx).await,

            BindingKind::KeyChord => {
                let phrase = ctx.group("keys");
                let chord = match KeyChord::parse(phrase, ctx.platform) {
                    Ok(chord) => chord,
                    Err(e) => return ExecutionResult::failure(e.to_string()),
                };
                match self.system.send_keystroke(&chord.key, &chord.modifiers) {
                    Ok(()) => ExecutionResult::success("Pressing keys..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }
        }
    }

    /// Shared handler for the turn off / reboot / cancel binding.
    async fn run_power(&self, ctx: &MatchContext) -> ExecutionResult {
        let (action, payload) = match ctx.group("action").to_ascii_lowercase().as_str() {
            "turn off" => (SystemAction::TurnOff, "Turning off..."),
            "reboot" => (SystemAction::Reboot, "Rebooting..."),
            "cancel" => (SystemAction::Cancel, "Aborting..."),
            // The pattern only admits the three alternations above.
            other => return ExecutionResult::failure(format!("unknown power action '{other}'")),
        };

        // The timeout clause is optional: default is 0 minutes, which the
        // registry clamps so the OS never sees a zero.  A digit string too
        // long to fit a u64 is rejected rather than silently defaulted.
        let timeout: u64 = match ctx.group("timeout") {
            "" => 0,
            digits => match digits.parse() {
                Ok(value) => value,
                Err(_) => return ExecutionResult::failure("timeout out of range"),
            },
        };
        let unit = TimeUnit::parse(ctx.group("unit")).unwrap_or(TimeUnit::Minutes);

        match actions::resolve(action, ctx.platform, timeout, unit) {
            Some(call) => match self.system.run_process(&call).await {
                Ok(_) => ExecutionResult::success(payload),
                Err(e) => ExecutionResult::failure(e.to_string()),
            },
            None => ExecutionResult::failure(ActionError::Unsupported.to_string()),
        }
    }

    // ── Custom commands ───────────────────────────────────────────────────────

    async fn run_custom(&self, custom: &CustomCommand) -> ExecutionResult {
        if custom.default_manner {
            self.open_with_default_handler(&custom.body)
        } else {
            // Raw-execute mode: the command's combined output is the payload.
            match self.system.run_process(&custom.body).await {
                Ok(output) => ExecutionResult::success(output.combined()),
                Err(e) => ExecutionResult::failure(e.to_string()),
            }
        }
    }

    /// `default_manner = true`: URL first, path fallback, hard failure on a
    /// structurally broken URL.
    fn open_with_default_handler(&self, body: &str) -> ExecutionResult {
        match Url::parse(body) {
            Ok(parsed) => match self.system.open_external(parsed.as_str()) {
                Ok(()) => ExecutionResult::success("Opening resource..."),
                Err(e) => ExecutionResult::failure(e.to_string()),
            },
            // "Not a URL" — plain words or a bare path — falls back to the
            // filesystem opener.
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                match self.system.open_path(body) {
                    Ok(()) => ExecutionResult::success("Opening path..."),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }
            // Anything else means the body *looked* like a URL but is broken
            // (bad port, bad IP, ...).  Surface it, don't guess.
            Err(e) => ExecutionResult::failure(e.to_string()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
