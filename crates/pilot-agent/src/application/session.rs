//! Session dispatch: one loop that owns the whole lifecycle of a relay
//! session, from listening through pairing to teardown.
//!
//! All stimuli reach the dispatcher as [`SessionEvent`]s on a single mpsc
//! channel.  Socket frames and peer lifecycle events are interleaved into one
//! ordered stream, so frame handling never races peer recreation and the
//! state transitions below hold without extra locking.
//!
//! ```text
//! Idle ──listen──▶ Listening ──first controller frame──▶ Paired
//!                      │                                    │
//!                      └────────socket closed───────────────┴──▶ Closed
//! ```
//!
//! # Information hiding
//!
//! When a command fails, the real error text goes to the local desktop
//! notification only.  The controller always receives the same generic
//! acknowledgement, so a remote party cannot probe the machine through
//! error messages.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pilot_core::{CommandResponse, CustomCommand, Device, ExecutionResult, RelayMessage};

use crate::application::executor::CommandExecutor;
use crate::application::peer::PeerBridge;

// ── States and events ─────────────────────────────────────────────────────────

/// Lifecycle of one relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet listening.
    Idle,
    /// Advertised on the relay, waiting for a controller.
    Listening,
    /// A controller has sent its first frame.
    Paired,
    /// Torn down.  Terminal.
    Closed,
}

/// One stimulus for the dispatch loop.  Socket and peer sources feed the
/// same channel so the loop observes them in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    /// A decoded frame from the relay socket.
    SocketFrame(RelayMessage),
    /// The relay socket closed or errored.
    SocketClosed,
    /// The local peer produced a signaling blob for the controller.
    PeerSignal(Value),
    /// The peer media connection dropped.
    PeerClosed,
    /// The peer media connection reported a fault.
    PeerError {
        code: Option<String>,
        message: String,
    },
}

/// Peer faults of this class mean the remote side went away, which the
/// `PeerClosed` path already handles.  They are logged, never surfaced.
const PEER_CONNECTION_FAILURE: &str = "ERR_CONNECTION_FAILURE";

// ── Outbound seams ────────────────────────────────────────────────────────────

/// Failure to deliver a frame on the session socket.
#[derive(Debug, Error)]
#[error("socket send failed: {0}")]
pub struct SinkError(pub String);

/// The outbound half of the relay socket.
#[async_trait]
pub trait SocketSink: Send + Sync {
    async fn send(&self, frame: Value) -> Result<(), SinkError>;
    /// Whether the underlying socket is still open.
    fn is_open(&self) -> bool;
}

/// Delivers messages to the local desktop user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Resolves a controller id to its display name.
#[async_trait]
pub trait ControllerDirectory: Send + Sync {
    /// `None` when the relay does not know the controller.
    async fn controller_name(&self, id: &str) -> Option<String>;
}

// ── The dispatcher ────────────────────────────────────────────────────────────

/// Drives one session to completion.
pub struct SessionDispatcher {
    device: Device,
    executor: Arc<CommandExecutor>,
    custom_commands: Vec<CustomCommand>,
    sink: Arc<dyn SocketSink>,
    notifier: Arc<dyn Notifier>,
    directory: Arc<dyn ControllerDirectory>,
    bridge: PeerBridge,
    state: SessionState,
}

impl SessionDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: Device,
        executor: Arc<CommandExecutor>,
        custom_commands: Vec<CustomCommand>,
        sink: Arc<dyn SocketSink>,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn ControllerDirectory>,
        bridge: PeerBridge,
    ) -> Self {
        Self {
            device,
            executor,
            custom_commands,
            sink,
            notifier,
            directory,
            bridge,
            state: SessionState::Idle,
        }
    }

    /// Consumes events until the socket closes.  Returns the terminal state.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> SessionState {
        self.state = SessionState::Listening;
        info!(device = %self.device.id, "session listening");

        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::SocketFrame(frame) => self.handle_frame(frame).await,
                SessionEvent::PeerSignal(blob) => self.forward_peer_signal(blob).await,
                SessionEvent::PeerClosed => self.handle_peer_closed().await,
                SessionEvent::PeerError { code, message } => {
                    self.handle_peer_error(code, message).await
                }
                SessionEvent::SocketClosed => break,
            }
        }

        self.bridge.destroy();
        self.state = SessionState::Closed;
        info!(device = %self.device.id, "session closed");
        self.state
    }

    // ── Inbound frames ────────────────────────────────────────────────────────

    async fn handle_frame(&mut self, frame: RelayMessage) {
        let Some(source) = frame.source.clone() else {
            debug!("dropping frame without source");
            return;
        };

        if self.state == SessionState::Listening {
            self.pair_with(&source).await;
        }

        if let Some(status) = &frame.status {
            let name = self.display_name(&source).await;
            self.notifier.notify(&format!("{name} is {status}")).await;
        }

        if let Some(signal) = &frame.signal {
            self.bridge.deliver_signal(signal);
        }

        if let Some(data) = &frame.data {
            self.handle_command(&source, data).await;
        }
    }

    /// First controller frame while listening: acknowledge and bring up the
    /// peer side.
    async fn pair_with(&mut self, source: &str) {
        self.state = SessionState::Paired;
        info!(controller = %source, "session paired");
        self.send_frame(RelayMessage::status(&self.device.id, "paired"))
            .await;
        self.bridge.start().await;
    }

    async fn handle_command(&mut self, source: &str, data: &str) {
        let result = self
            .executor
            .execute_command(data, &self.custom_commands)
            .await;

        let response = match result {
            ExecutionResult::Success { payload } => CommandResponse::new(payload),
            ExecutionResult::Failure { error } => {
                // Real error stays local; the wire sees the generic ack.
                let name = self.display_name(source).await;
                self.notifier
                    .notify(&format!("{name}: {data}: {error}"))
                    .await;
                CommandResponse::generic()
            }
        };

        match serde_json::to_value(&response) {
            Ok(frame) => {
                if let Err(e) = self.sink.send(frame).await {
                    warn!("failed to acknowledge command: {e}");
                }
            }
            Err(e) => warn!("failed to encode command response: {e}"),
        }
    }

    // ── Peer lifecycle ────────────────────────────────────────────────────────

    async fn forward_peer_signal(&mut self, blob: Value) {
        let frame = RelayMessage::signal(&self.device.id, blob);
        self.send_frame(frame).await;
    }

    async fn handle_peer_closed(&mut self) {
        if let Some(ready) = self.bridge.handle_peer_closed(self.sink.is_open()).await {
            if let Err(e) = self.sink.send(ready).await {
                warn!("failed to announce peer readiness: {e}");
            }
        }
    }

    async fn handle_peer_error(&mut self, code: Option<String>, message: String) {
        if code.as_deref() == Some(PEER_CONNECTION_FAILURE) {
            debug!("peer connection dropped: {message}");
            return;
        }
        warn!("peer error: {message}");
        self.notifier
            .notify(&format!("Streaming error: {message}"))
            .await;
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn send_frame(&self, frame: RelayMessage) {
        match serde_json::to_value(&frame) {
            Ok(value) => {
                if let Err(e) = self.sink.send(value).await {
                    warn!("failed to send session frame: {e}");
                }
            }
            Err(e) => warn!("failed to encode session frame: {e}"),
        }
    }

    async fn display_name(&self, controller_id: &str) -> String {
        match self.directory.controller_name(controller_id).await {
            Some(name) => name,
            None => controller_id.to_string(),
        }
    }
}
