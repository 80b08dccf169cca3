//! DeskPilot agent entry point.
//!
//! Wires together the device identity, the command executor, and the relay
//! session, then runs until interrupted.
//!
//! ```text
//! main()
//!  └─ detect_device()          -- stable id + hostname
//!  └─ RelayApi::register()     -- announce to the relay
//!  └─ RelaySession::listen()   -- access key + socket + dispatcher
//!  └─ ctrl_c                   -- stop(): release key, close socket
//! ```
//!
//! With `--execute`, one phrase is interpreted and executed locally and the
//! result printed, with no relay involved.  Useful for trying out commands
//! and for scripting.
//!
//! With `--push-commands <FILE>`, the JSON command list in FILE replaces
//! this device's stored custom commands on the relay, then the agent exits.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pilot_agent::application::executor::CommandExecutor;
use pilot_agent::application::session::Notifier;
use pilot_agent::domain::AgentConfig;
use pilot_agent::infrastructure::identity::detect_device;
use pilot_agent::infrastructure::notify::DesktopNotifier;
use pilot_agent::infrastructure::relay::{RelayApi, RelaySession};
use pilot_agent::infrastructure::system::ShellSystemActions;
use pilot_core::{CustomCommand, ExecutionResult};

/// Voice-friendly remote control agent for the local desktop.
#[derive(Parser, Debug)]
#[command(name = "pilot-agent", version, about)]
struct Cli {
    /// Relay server host.
    #[arg(long, default_value = "localhost", env = "PILOT_RELAY_HOST")]
    relay_host: String,

    /// Relay server port.
    #[arg(long, default_value_t = 49150, env = "PILOT_RELAY_PORT")]
    relay_port: u16,

    /// Display name to register under (defaults to the hostname).
    #[arg(long, env = "PILOT_DEVICE_NAME")]
    device_name: Option<String>,

    /// Execute one command phrase locally and exit.
    #[arg(long, value_name = "PHRASE")]
    execute: Option<String>,

    /// Replace this device's custom commands on the relay from a JSON file
    /// and exit.
    #[arg(long, value_name = "FILE")]
    push_commands: Option<std::path::PathBuf>,
}

/// Parses a custom-command file: a JSON array of
/// `{"phrase", "body", "defaultManner"}` objects.
fn parse_commands(json: &str) -> serde_json::Result<Vec<CustomCommand>> {
    serde_json::from_str(json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AgentConfig {
        relay_host: cli.relay_host,
        relay_port: cli.relay_port,
        device_name: cli.device_name,
    };

    let executor = Arc::new(CommandExecutor::new(Arc::new(ShellSystemActions::new())));

    // One-shot local mode: no relay, no session.
    if let Some(phrase) = cli.execute {
        return match executor.execute_command(&phrase, &[]).await {
            ExecutionResult::Success { payload } => {
                println!("{payload}");
                Ok(())
            }
            ExecutionResult::Failure { error } => {
                eprintln!("{error}");
                std::process::exit(1);
            }
        };
    }

    let device = detect_device(config.device_name.clone());
    info!(
        "DeskPilot agent starting as {} ({}) on {}",
        device.name, device.id, device.platform
    );

    let api = Arc::new(RelayApi::new(&config));
    api.register(&device)
        .await
        .with_context(|| format!("failed to register with relay at {}", config.http_origin()))?;

    // Push mode: replace the stored custom command list and exit.
    if let Some(path) = cli.push_commands {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let commands = parse_commands(&json)
            .with_context(|| format!("invalid command file {}", path.display()))?;
        api.save_commands(&device.id, &commands)
            .await
            .context("failed to save custom commands")?;
        info!("pushed {} custom commands for {}", commands.len(), device.id);
        return Ok(());
    }

    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new(device.platform));
    let session = RelaySession::listen(
        Arc::clone(&api),
        &config,
        device,
        executor,
        Arc::clone(&notifier),
    )
    .await
    .context("failed to start listening session")?;

    info!("listening; pair a controller with access key {}", session.key());
    notifier
        .notify(&format!("Ready to pair. Access key: {}", session.key()))
        .await;

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl-C handler")?;
    info!("shutdown signal received");

    match session.stop().await {
        Ok(state) => info!("session ended in state {state:?}"),
        Err(e) => warn!("session teardown incomplete: {e}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_file_parses_the_relay_wire_shape() {
        let json = r#"[
            {"phrase": "open mail", "body": "https://mail.example.com", "defaultManner": true},
            {"phrase": "backup", "body": "rsync -a ~/docs /mnt/backup", "defaultManner": false}
        ]"#;

        let commands = parse_commands(json).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].phrase, "open mail");
        assert!(commands[0].default_manner);
        assert!(!commands[1].default_manner);
    }

    #[test]
    fn test_command_file_rejects_non_list_bodies() {
        assert!(parse_commands(r#"{"phrase": "x"}"#).is_err());
        assert!(parse_commands("").is_err());
    }
}
