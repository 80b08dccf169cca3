//! Peer bridge: forwards signaling blobs between the relay socket and a
//! peer media connection, and keeps the peer alive across drops.
//!
//! The bridge never inspects signaling payloads.  They are opaque JSON that
//! belongs to the peer layer on both ends; the bridge's job is routing and
//! lifecycle, nothing else.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::session::SessionEvent;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Faults from the peer connector.
#[derive(Debug, Error)]
pub enum PeerError {
    /// No peer media stack is available in this build.
    #[error("peer media is not supported in this build")]
    Unsupported,
    /// The connector exists but peer creation failed.
    #[error("peer setup failed: {0}")]
    Failed(String),
}

// ── Connector seam ────────────────────────────────────────────────────────────

/// Creates peer media connections.
///
/// The production build ships without a media stack and uses
/// [`UnsupportedPeerConnector`](crate::infrastructure::peer::UnsupportedPeerConnector);
/// tests inject a recording connector.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Creates one peer.  The peer reports its own lifecycle back through
    /// `events` as [`SessionEvent::PeerSignal`], [`SessionEvent::PeerClosed`],
    /// or [`SessionEvent::PeerError`].
    async fn create_peer(
        &self,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Box<dyn PeerHandle>, PeerError>;
}

/// One live peer connection.
pub trait PeerHandle: Send + Sync {
    /// Delivers an inbound signaling blob from the controller.
    fn signal(&self, blob: &Value);
    /// Tears the connection down.  The handle must not be used afterwards.
    fn destroy(&self);
}

// ── The bridge ────────────────────────────────────────────────────────────────

/// Owns at most one peer at a time and recreates it when it drops while the
/// relay socket is still open.
pub struct PeerBridge {
    device_id: String,
    connector: Box<dyn PeerConnector>,
    events: mpsc::Sender<SessionEvent>,
    peer: Option<Box<dyn PeerHandle>>,
}

impl PeerBridge {
    pub fn new(
        device_id: impl Into<String>,
        connector: Box<dyn PeerConnector>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            connector,
            events,
            peer: None,
        }
    }

    /// Creates the initial peer.  An unsupported connector is not a session
    /// fault: command traffic continues without media.
    pub async fn start(&mut self) {
        match self.connector.create_peer(self.events.clone()).await {
            Ok(handle) => self.peer = Some(handle),
            Err(PeerError::Unsupported) => {
                debug!("no peer media stack in this build, continuing without");
                self.peer = None;
            }
            Err(e) => {
                warn!("peer setup failed: {e}");
                self.peer = None;
            }
        }
    }

    /// Routes an inbound signaling blob to the live peer, if any.
    pub fn deliver_signal(&self, blob: &Value) {
        match &self.peer {
            Some(peer) => peer.signal(blob),
            None => debug!("dropping signal, no live peer"),
        }
    }

    /// Handles the peer dropping.  While the relay socket is still open,
    /// exactly one replacement peer is created and one readiness frame is
    /// produced for the controller to renegotiate against.  A closed socket
    /// means the session is over and nothing is recreated.
    pub async fn handle_peer_closed(&mut self, socket_open: bool) -> Option<Value> {
        // The dropped handle is gone either way.
        if let Some(old) = self.peer.take() {
            old.destroy();
        }
        if !socket_open {
            return None;
        }
        self.start().await;
        let ready = pilot_core::RelayMessage::status(&self.device_id, "ready");
        serde_json::to_value(&ready).ok()
    }

    /// Tears down the live peer, if any.
    pub fn destroy(&mut self) {
        if let Some(peer) = self.peer.take() {
            peer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::peer::{MockPeerConnector, UnsupportedPeerConnector};

    fn bridge_with_mock() -> (PeerBridge, std::sync::Arc<MockPeerConnector>) {
        let connector = std::sync::Arc::new(MockPeerConnector::new());
        let (tx, _rx) = mpsc::channel(8);
        let bridge = PeerBridge::new("dev-1", Box::new(SharedConnector(connector.clone())), tx);
        (bridge, connector)
    }

    /// Adapter so tests can keep a handle on the connector the bridge owns.
    struct SharedConnector(std::sync::Arc<MockPeerConnector>);

    #[async_trait]
    impl PeerConnector for SharedConnector {
        async fn create_peer(
            &self,
            events: mpsc::Sender<SessionEvent>,
        ) -> Result<Box<dyn PeerHandle>, PeerError> {
            self.0.create_peer(events).await
        }
    }

    #[tokio::test]
    async fn test_start_creates_exactly_one_peer() {
        let (mut bridge, connector) = bridge_with_mock();
        bridge.start().await;
        assert_eq!(connector.created(), 1);
    }

    #[tokio::test]
    async fn test_peer_drop_with_open_socket_recreates_once_and_reports_ready() {
        let (mut bridge, connector) = bridge_with_mock();
        bridge.start().await;

        let frame = bridge.handle_peer_closed(true).await;

        assert_eq!(connector.created(), 2);
        let frame = frame.unwrap();
        assert_eq!(frame["source"], "dev-1");
        assert_eq!(frame["status"], "ready");
    }

    #[tokio::test]
    async fn test_peer_drop_with_closed_socket_recreates_nothing() {
        let (mut bridge, connector) = bridge_with_mock();
        bridge.start().await;

        let frame = bridge.handle_peer_closed(false).await;

        assert!(frame.is_none());
        assert_eq!(connector.created(), 1);
        // Signals have nowhere to go now.
        bridge.deliver_signal(&serde_json::json!({"sdp": "x"}));
        assert!(connector.signals().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_handle_is_destroyed_and_never_reused() {
        let (mut bridge, connector) = bridge_with_mock();
        bridge.start().await;

        bridge.handle_peer_closed(true).await;
        bridge.deliver_signal(&serde_json::json!({"candidate": "c"}));

        // The signal landed on the replacement peer, not the destroyed one.
        let destroyed = connector.destroyed();
        assert_eq!(destroyed, 1);
        let signals = connector.signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, 1, "signal must land on the second peer");
    }

    #[tokio::test]
    async fn test_unsupported_connector_is_not_fatal() {
        let (tx, _rx) = mpsc::channel(8);
        let mut bridge = PeerBridge::new("dev-1", Box::new(UnsupportedPeerConnector), tx);

        bridge.start().await;
        // No peer, but signal delivery and teardown still behave.
        bridge.deliver_signal(&serde_json::json!({"sdp": "x"}));
        bridge.destroy();
    }
}
