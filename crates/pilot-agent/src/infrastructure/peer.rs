//! Peer connector implementations.
//!
//! This build carries no peer media stack, so the production connector is
//! [`UnsupportedPeerConnector`]: the session runs command traffic only and
//! the bridge logs that media is unavailable.  [`MockPeerConnector`] records
//! peer lifecycle for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::application::peer::{PeerConnector, PeerError, PeerHandle};
use crate::application::session::SessionEvent;

// ── Production ────────────────────────────────────────────────────────────────

/// A connector for builds without a media stack.  Every creation attempt
/// reports [`PeerError::Unsupported`], which the bridge treats as "run the
/// session without media".
pub struct UnsupportedPeerConnector;

#[async_trait]
impl PeerConnector for UnsupportedPeerConnector {
    async fn create_peer(
        &self,
        _events: mpsc::Sender<SessionEvent>,
    ) -> Result<Box<dyn PeerHandle>, PeerError> {
        Err(PeerError::Unsupported)
    }
}

// ── Test double ───────────────────────────────────────────────────────────────

/// Shared ledger between a [`MockPeerConnector`] and the handles it creates.
#[derive(Default)]
struct PeerLedger {
    created: AtomicUsize,
    destroyed: AtomicUsize,
    /// (peer index, blob) pairs in delivery order.
    signals: Mutex<Vec<(usize, Value)>>,
}

/// A connector that hands out recording peers.  Tests can count creations
/// and teardowns and inspect which peer received which signal.
pub struct MockPeerConnector {
    ledger: Arc<PeerLedger>,
}

impl MockPeerConnector {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(PeerLedger::default()),
        }
    }

    /// Number of peers created so far.
    pub fn created(&self) -> usize {
        self.ledger.created.load(Ordering::SeqCst)
    }

    /// Number of peers destroyed so far.
    pub fn destroyed(&self) -> usize {
        self.ledger.destroyed.load(Ordering::SeqCst)
    }

    /// All delivered signals as (peer index, blob), in order.
    pub fn signals(&self) -> Vec<(usize, Value)> {
        self.ledger.signals.lock().unwrap().clone()
    }
}

impl Default for MockPeerConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerConnector for MockPeerConnector {
    async fn create_peer(
        &self,
        _events: mpsc::Sender<SessionEvent>,
    ) -> Result<Box<dyn PeerHandle>, PeerError> {
        let index = self.ledger.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPeerHandle {
            index,
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

/// A recording peer.  `index` identifies which creation this handle came
/// from, so tests can prove a destroyed peer never sees another signal.
pub struct MockPeerHandle {
    index: usize,
    ledger: Arc<PeerLedger>,
}

impl PeerHandle for MockPeerHandle {
    fn signal(&self, blob: &Value) {
        self.ledger
            .signals
            .lock()
            .unwrap()
            .push((self.index, blob.clone()));
    }

    fn destroy(&self) {
        self.ledger.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
