//! End-to-end command flow: phrase in, side effects and payload out.
//!
//! These tests drive the real matcher and executor against the recording
//! mock, so they cover the full interpretation path a relay `data` frame
//! takes short of the socket itself.

use std::sync::Arc;

use pilot_agent::application::actions::SystemActions;
use pilot_agent::application::executor::CommandExecutor;
use pilot_agent::application::matcher::{CommandTable, Match};
use pilot_agent::infrastructure::system::MockSystemActions;
use pilot_core::{CustomCommand, ExecutionResult, Platform};

fn executor(platform: Platform) -> (CommandExecutor, Arc<MockSystemActions>) {
    let mock = Arc::new(MockSystemActions::new(platform));
    let exec = CommandExecutor::new(Arc::clone(&mock) as Arc<dyn SystemActions>);
    (exec, mock)
}

fn custom(phrase: &str, body: &str, default_manner: bool) -> CustomCommand {
    CustomCommand {
        phrase: phrase.to_string(),
        body: body.to_string(),
        default_manner,
    }
}

// ── Matcher ordering ──────────────────────────────────────────────────────────

#[test]
fn earlier_binding_wins_when_two_patterns_match() {
    // "type hello save this note" matches both the note binding and the
    // type binding; the note binding sits earlier in the table.
    let table = CommandTable::builtin();
    match table.lookup("type hello save this note", &[], Platform::Linux) {
        Match::Builtin { context, .. } => {
            assert_eq!(context.group("text"), "type hello");
        }
        other => panic!("expected a builtin match, got {:?}", other),
    }
}

#[test]
fn catch_all_guarantees_a_match_for_any_nonempty_input() {
    let table = CommandTable::builtin();
    for input in ["ctrl c", "zzz unmatched zzz", "q"] {
        assert!(
            !matches!(table.lookup(input, &[], Platform::Linux), Match::NotFound),
            "catch-all should have absorbed {input:?}"
        );
    }
}

#[test]
fn custom_phrase_pre_empts_builtins_case_insensitively() {
    let table = CommandTable::builtin();
    let customs = vec![custom("Browse example.com", "echo intercepted", false)];

    match table.lookup("browse example.com", &customs, Platform::Linux) {
        Match::Custom(c) => assert_eq!(c.body, "echo intercepted"),
        other => panic!("expected the custom match, got {:?}", other),
    }
}

// ── Built-in execution ────────────────────────────────────────────────────────

#[tokio::test]
async fn browse_opens_exactly_one_url_and_nothing_else() {
    let (exec, mock) = executor(Platform::Linux);

    let result = exec.execute_command("browse example.com", &[]).await;

    assert_eq!(result, ExecutionResult::success("Browsing resource..."));
    assert_eq!(
        mock.opened_urls.lock().unwrap().as_slice(),
        ["https://example.com/"]
    );
    assert!(mock.opened_paths.lock().unwrap().is_empty());
    assert!(mock.processes.lock().unwrap().is_empty());
    assert!(mock.keystrokes.lock().unwrap().is_empty());
    assert!(mock.typed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn turn_off_without_timeout_defaults_to_one_minute_on_linux() {
    let (exec, mock) = executor(Platform::Linux);

    let result = exec.execute_command("turn off", &[]).await;

    assert!(result.is_success());
    assert_eq!(mock.processes.lock().unwrap().as_slice(), ["shutdown -h 1"]);
}

#[tokio::test]
async fn turn_off_in_one_hour_converts_per_platform() {
    let (exec, mock) = executor(Platform::Windows);

    let result = exec.execute_command("turn off in 1 hour", &[]).await;

    assert_eq!(result, ExecutionResult::success("Turning off..."));
    assert_eq!(
        mock.processes.lock().unwrap().as_slice(),
        ["shutdown /s /t 3600"]
    );
}

#[tokio::test]
async fn turn_off_with_a_huge_timeout_saturates_instead_of_panicking() {
    // u64::MAX hours overflows the hours-to-seconds conversion unless the
    // registry saturates; the phrase must still resolve to a command.
    let (exec, mock) = executor(Platform::Windows);

    let result = exec
        .execute_command("turn off in 18446744073709551615 hours", &[])
        .await;

    assert_eq!(result, ExecutionResult::success("Turning off..."));
    assert_eq!(
        mock.processes.lock().unwrap().as_slice(),
        [format!("shutdown /s /t {}", u64::MAX)]
    );
}

#[tokio::test]
async fn turn_off_with_an_unparseable_timeout_fails_without_scheduling() {
    // One digit past u64::MAX: reject it outright rather than silently
    // substituting the default timeout.
    let (exec, mock) = executor(Platform::Linux);

    let result = exec
        .execute_command("turn off in 99999999999999999999 minutes", &[])
        .await;

    assert_eq!(result, ExecutionResult::failure("timeout out of range"));
    assert!(mock.processes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn power_actions_on_darwin_fail_as_unsupported() {
    let (exec, mock) = executor(Platform::Darwin);

    let result = exec.execute_command("reboot", &[]).await;

    assert_eq!(
        result,
        ExecutionResult::failure("unsupported on this platform")
    );
    assert!(mock.processes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn catch_all_attempts_unmatched_text_as_a_key_chord() {
    let (exec, mock) = executor(Platform::Linux);

    // A valid chord presses keys, gibberish reports an error; either way
    // the input never falls through unhandled.
    let ok = exec.execute_command("windows e", &[]).await;
    assert_eq!(ok, ExecutionResult::success("Pressing keys..."));
    {
        let keys = mock.keystrokes.lock().unwrap();
        assert_eq!(keys[0], ("e".to_string(), vec!["super".to_string()]));
    }

    let bad = exec.execute_command("asdkfj", &[]).await;
    assert!(!bad.is_success());
}

// ── Custom command execution ──────────────────────────────────────────────────

#[tokio::test]
async fn custom_url_body_opens_externally_without_path_fallback() {
    let (exec, mock) = executor(Platform::Linux);
    let customs = vec![custom("mail", "https://example.com", true)];

    let result = exec.execute_command("mail", &customs).await;

    assert_eq!(result, ExecutionResult::success("Opening resource..."));
    assert_eq!(
        mock.opened_urls.lock().unwrap().as_slice(),
        ["https://example.com/"]
    );
    assert!(mock.opened_paths.lock().unwrap().is_empty());
}

#[tokio::test]
async fn custom_plain_text_body_falls_back_to_path_open() {
    let (exec, mock) = executor(Platform::Linux);
    let customs = vec![custom("album", "not a valid url", true)];

    let result = exec.execute_command("album", &customs).await;

    assert_eq!(result, ExecutionResult::success("Opening path..."));
    assert_eq!(
        mock.opened_paths.lock().unwrap().as_slice(),
        ["not a valid url"]
    );
    assert!(mock.opened_urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn custom_raw_execute_reports_combined_output_as_payload() {
    let (exec, mock) = executor(Platform::Linux);
    mock.set_process_output("Filesystem mounted\n");
    let customs = vec![custom("disk", "df -h", false)];

    let result = exec.execute_command("disk", &customs).await;

    assert_eq!(result, ExecutionResult::success("Filesystem mounted"));
    assert_eq!(mock.processes.lock().unwrap().as_slice(), ["df -h"]);
}

#[tokio::test]
async fn capability_failures_become_failure_results_not_errors() {
    let (exec, mock) = executor(Platform::Linux);
    mock.fail_all();

    for phrase in ["browse example.com", "type hi", "close", "mute"] {
        let result = exec.execute_command(phrase, &[]).await;
        assert!(
            !result.is_success(),
            "{phrase:?} should fail when every capability fails"
        );
    }
}
