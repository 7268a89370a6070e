use crate::breaker::AvailabilityBreaker;
use crate::directory::service::PeerDirectory;
use crate::directory::types::PeerId;
use crate::registry::service::NodeRegistry;

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Peers whose connections are attached to this node.
pub struct LocalPeers {
    peers: DashMap<PeerId, Instant>,
    directory: Arc<PeerDirectory>,
    breaker: Arc<AvailabilityBreaker>,
    /// Set when a directory write may have been skipped or lost.
    needs_resync: AtomicBool,
}

impl LocalPeers {
    pub fn new(directory: Arc<PeerDirectory>, breaker: Arc<AvailabilityBreaker>) -> Arc<Self> {
        Arc::new(Self {
            peers: DashMap::new(),
            directory,
            breaker,
            needs_resync: AtomicBool::new(false),
        })
    }

    pub async fn attach(&self, peer_id: PeerId) {
        self.directory.register_local_peer(&peer_id).await;
        if !self.breaker.is_available() {
            self.needs_resync.store(true, Ordering::Release);
        }

        if self.peers.insert(peer_id.clone(), Instant::now()).is_none() {
            tracing::info!("Peer {} attached ({} local)", peer_id, self.peers.len());
        }
    }

    /// Returns whether the peer was attached here.
    pub async fn detach(&self, peer_id: &PeerId) -> bool {
        if self.peers.remove(peer_id).is_none() {
            return false;
        }

        self.directory.deregister_local_peer(peer_id).await;
        tracing::info!("Peer {} detached ({} local)", peer_id, self.peers.len());
        true
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Re-registers a peer from a heartbeat snapshot.
    ///
    /// A detach racing the write must win: the peer is skipped if already gone, and its
    /// record is removed again if it detached while the write was in flight.
    async fn resync_peer(&self, peer_id: &PeerId) {
        if !self.contains(peer_id) {
            return;
        }

        self.directory.register_local_peer(peer_id).await;

        if !self.contains(peer_id) {
            tracing::debug!("Peer {} detached during resync, removing record", peer_id);
            self.directory.deregister_local_peer(peer_id).await;
        }
    }
}

/// Periodic publication of load and peer liveness.
pub struct Heartbeat {
    peers: Arc<LocalPeers>,
    registry: Arc<NodeRegistry>,
    interval: Duration,
}

impl Heartbeat {
    pub fn new(peers: Arc<LocalPeers>, registry: Arc<NodeRegistry>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            peers,
            registry,
            interval,
        })
    }

    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tracing::info!("Starting heartbeat every {:?}", self.interval);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    pub async fn tick(&self) {
        let peers = &self.peers;
        self.registry.publish_client_count(peers.len()).await;

        if !peers.breaker.is_available() {
            peers.needs_resync.store(true, Ordering::Release);
            tracing::debug!("Store unavailable, deferring peer refresh");
            return;
        }

        let ids = peers.ids();
        if peers.needs_resync.swap(false, Ordering::AcqRel) {
            tracing::info!("Re-registering {} local peers after store outage", ids.len());
            for peer_id in &ids {
                peers.resync_peer(peer_id).await;
            }
        } else {
            for peer_id in &ids {
                peers.directory.refresh_local_peer_ttl(peer_id).await;
            }
        }

        if !peers.breaker.is_available() {
            peers.needs_resync.store(true, Ordering::Release);
        }

        tracing::debug!("Heartbeat: {} local peers", ids.len());
    }
}
