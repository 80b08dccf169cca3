//! WebSocket session transport.
//!
//! This module is responsible for:
//!
//! 1. Acquiring an access key from the relay (`PUT /device/listen/`).
//! 2. Dialing the relay's WebSocket endpoint.
//! 3. Running a reader task that decodes inbound text frames into
//!    [`RelayMessage`]s and feeds them to the session dispatcher as
//!    [`SessionEvent`]s.
//! 4. Exposing the outbound half as a [`SocketSink`] the dispatcher and the
//!    peer bridge share.
//!
//! The reader task and the dispatcher communicate over one mpsc channel, so
//! the dispatcher observes socket frames and peer lifecycle events in a
//! single ordered stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use pilot_core::{Device, RelayMessage};

use crate::application::executor::CommandExecutor;
use crate::application::peer::PeerBridge;
use crate::application::session::{
    Notifier, SessionDispatcher, SessionEvent, SessionState, SinkError, SocketSink,
};
use crate::domain::AgentConfig;
use crate::infrastructure::peer::UnsupportedPeerConnector;
use crate::infrastructure::relay::http::{RelayApi, RelayError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Outbound half ─────────────────────────────────────────────────────────────

/// The write half of the relay socket, shareable across tasks.
pub struct WsSink {
    writer: tokio::sync::Mutex<SplitSink<WsStream, WsMessage>>,
    open: AtomicBool,
}

impl WsSink {
    fn new(writer: SplitSink<WsStream, WsMessage>) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
            open: AtomicBool::new(true),
        }
    }

    fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Sends a Close frame and marks the sink closed.  Safe to call more
    /// than once.
    async fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(WsMessage::Close(None)).await {
            debug!("close frame not delivered: {e}");
        }
    }
}

#[async_trait]
impl SocketSink for WsSink {
    async fn send(&self, frame: serde_json::Value) -> Result<(), SinkError> {
        if !self.is_open() {
            return Err(SinkError("socket already closed".into()));
        }
        let text = frame.to_string();
        let mut writer = self.writer.lock().await;
        writer.send(WsMessage::Text(text)).await.map_err(|e| {
            self.mark_closed();
            SinkError(e.to_string())
        })
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

// ── Inbound half ──────────────────────────────────────────────────────────────

/// Reads frames until the socket ends, feeding decoded messages to the
/// dispatcher.  One malformed frame is logged and skipped rather than
/// tearing the session down.
async fn read_socket_frames(
    mut reader: SplitStream<WsStream>,
    sink: Arc<WsSink>,
    events: mpsc::Sender<SessionEvent>,
) {
    loop {
        let message = match reader.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                warn!("relay socket error: {e}");
                break;
            }
            None => {
                debug!("relay socket stream ended");
                break;
            }
        };

        match message {
            WsMessage::Text(text) => match serde_json::from_str::<RelayMessage>(&text) {
                Ok(frame) => {
                    if events.send(SessionEvent::SocketFrame(frame)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("malformed relay frame (skipped): {e}"),
            },
            WsMessage::Close(_) => {
                debug!("relay sent Close frame");
                break;
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => {}
            other => debug!("ignoring non-text relay frame: {other:?}"),
        }
    }

    sink.mark_closed();
    let _ = events.send(SessionEvent::SocketClosed).await;
}

// ── Session orchestration ─────────────────────────────────────────────────────

/// One live listening session: access key, socket, and dispatcher task.
pub struct RelaySession {
    key: String,
    device_id: String,
    api: Arc<RelayApi>,
    sink: Arc<WsSink>,
    dispatcher: JoinHandle<SessionState>,
}

impl RelaySession {
    /// Brings a session up: acquires the access key, dials the socket, loads
    /// the saved custom commands, and spawns the reader and dispatcher.
    ///
    /// # Errors
    ///
    /// Fails if the relay refuses the listen request or the WebSocket dial
    /// fails; no session state is left behind in that case.
    pub async fn listen(
        api: Arc<RelayApi>,
        config: &AgentConfig,
        device: Device,
        executor: Arc<CommandExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RelayError> {
        let key = api.listen(&device.id).await?;
        info!(device = %device.id, "listening with access key {key}");

        let (ws_stream, _) = connect_async(config.ws_url())
            .await
            .map_err(|e| RelayError::Socket(e.to_string()))?;

        // A missing or unreadable command list is not fatal: the built-ins
        // still work, so start with an empty custom set.
        let custom_commands = match api.load_commands(&device.id).await {
            Ok(commands) => commands,
            Err(e) => {
                warn!("could not load custom commands: {e}");
                Vec::new()
            }
        };

        let (writer, reader) = ws_stream.split();
        let sink = Arc::new(WsSink::new(writer));
        let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(64);

        tokio::spawn(read_socket_frames(
            reader,
            Arc::clone(&sink),
            events_tx.clone(),
        ));

        let bridge = PeerBridge::new(
            device.id.clone(),
            Box::new(UnsupportedPeerConnector),
            events_tx,
        );
        let device_id = device.id.clone();
        let dispatcher = SessionDispatcher::new(
            device,
            executor,
            custom_commands,
            Arc::clone(&sink) as Arc<dyn SocketSink>,
            notifier,
            Arc::clone(&api) as Arc<dyn crate::application::session::ControllerDirectory>,
            bridge,
        );
        let dispatcher = tokio::spawn(dispatcher.run(events_rx));

        Ok(Self {
            key,
            device_id,
            api,
            sink,
            dispatcher,
        })
    }

    /// The access key a controller pairs with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Tears the session down: releases the key server-side, closes the
    /// socket, and waits for the dispatcher to drain.  Safe while a command
    /// execution is still in flight; its result is simply not delivered.
    pub async fn stop(self) -> Result<SessionState, RelayError> {
        if let Err(e) = self.api.stop(&self.device_id).await {
            warn!("relay stop request failed: {e}");
        }
        self.sink.close().await;
        self.dispatcher
            .await
            .map_err(|e| RelayError::Socket(format!("dispatcher task failed: {e}")))
    }

    /// Waits for the session to end on its own (socket closed by the relay).
    pub async fn wait(self) -> Result<SessionState, RelayError> {
        self.dispatcher
            .await
            .map_err(|e| RelayError::Socket(format!("dispatcher task failed: {e}")))
    }
}
