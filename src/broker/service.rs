use crate::breaker::{AvailabilityBreaker, BREAK_DURATION};
use crate::directory::cache::{PEER_CACHE_CAPACITY, PeerCache};
use crate::directory::service::PeerDirectory;
use crate::directory::types::PeerId;
use crate::node::types::NodeAddress;
use crate::presence::service::{Heartbeat, LocalPeers};
use crate::queue::consumer::QueueConsumer;
use crate::queue::service::MessageQueue;
use crate::registry::service::NodeRegistry;
use crate::store::client::{KvStore, RedisStore};
use crate::store::memory::MemoryStore;
use crate::store::types::StoreConfig;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Tunables that are not part of the store topology.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub peer_cache_capacity: usize,
    /// Optional age limit for cached peer owners. `None` keeps entries until evicted.
    pub peer_cache_ttl: Option<Duration>,
    pub break_duration: Duration,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            peer_cache_capacity: PEER_CACHE_CAPACITY,
            peer_cache_ttl: None,
            break_duration: BREAK_DURATION,
        }
    }
}

pub struct SignalBroker {
    address: NodeAddress,
    breaker: Arc<AvailabilityBreaker>,
    directory: Arc<PeerDirectory>,
    registry: Arc<NodeRegistry>,
    queue: Arc<MessageQueue>,
    peers: Arc<LocalPeers>,
}

impl SignalBroker {
    /// Connects to the store described by `config` and builds the broker for `address`.
    ///
    /// The breaker starts unavailable and is opened only once the connection succeeds.
    pub async fn connect(
        config: &StoreConfig,
        address: NodeAddress,
        options: BrokerOptions,
    ) -> Result<Arc<Self>> {
        let breaker = AvailabilityBreaker::with_cooldown(options.break_duration);

        let store: Arc<dyn KvStore> = match config {
            StoreConfig::Memory => {
                tracing::warn!("Using in-memory store, peers on other nodes are invisible");
                MemoryStore::new()
            }
            _ => Arc::new(RedisStore::connect(config).await?),
        };
        breaker.mark_available();

        Ok(Self::assemble(store, breaker, address, options))
    }

    /// Builds a broker around an already connected store.
    pub fn with_store(
        store: Arc<dyn KvStore>,
        address: NodeAddress,
        options: BrokerOptions,
    ) -> Arc<Self> {
        let breaker = AvailabilityBreaker::with_cooldown(options.break_duration);
        breaker.mark_available();
        Self::assemble(store, breaker, address, options)
    }

    fn assemble(
        store: Arc<dyn KvStore>,
        breaker: Arc<AvailabilityBreaker>,
        address: NodeAddress,
        options: BrokerOptions,
    ) -> Arc<Self> {
        let cache = PeerCache::new(options.peer_cache_capacity, options.peer_cache_ttl);
        let directory = Arc::new(PeerDirectory::new(
            store.clone(),
            breaker.clone(),
            address.clone(),
            cache,
        ));
        let registry = Arc::new(NodeRegistry::new(
            store.clone(),
            breaker.clone(),
            address.clone(),
        ));
        let queue = Arc::new(MessageQueue::new(store, breaker.clone()));
        let peers = LocalPeers::new(directory.clone(), breaker.clone());

        tracing::info!("Signal broker ready as {}", address);

        Arc::new(Self {
            address,
            breaker,
            directory,
            registry,
            queue,
            peers,
        })
    }

    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    pub fn is_store_available(&self) -> bool {
        self.breaker.is_available()
    }

    pub fn breaker(&self) -> &Arc<AvailabilityBreaker> {
        &self.breaker
    }

    pub fn directory(&self) -> &Arc<PeerDirectory> {
        &self.directory
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    pub fn local_peers(&self) -> &Arc<LocalPeers> {
        &self.peers
    }

    // --- Peer directory ---

    pub async fn register_local_peer(&self, peer_id: &PeerId) {
        self.directory.register_local_peer(peer_id).await
    }

    pub async fn deregister_local_peer(&self, peer_id: &PeerId) {
        self.directory.deregister_local_peer(peer_id).await
    }

    pub async fn refresh_local_peer_ttl(&self, peer_id: &PeerId) {
        self.directory.refresh_local_peer_ttl(peer_id).await
    }

    pub async fn resolve_peer_address(&self, peer_id: &PeerId) -> Option<NodeAddress> {
        self.directory.resolve_peer_address(peer_id).await
    }

    // --- Node registry ---

    pub async fn publish_client_count(&self, count: usize) {
        self.registry.publish_client_count(count).await
    }

    pub async fn query_node_client_count(&self, addr: &NodeAddress) -> i64 {
        self.registry.query_node_client_count(addr).await
    }

    // --- Message queue ---

    pub async fn enqueue(&self, addr: &NodeAddress, message: &[u8]) {
        self.queue.enqueue(addr, message).await
    }

    pub async fn dequeue_blocking(&self, addr: &NodeAddress, timeout: Duration) -> Option<Vec<u8>> {
        self.queue.dequeue_blocking(addr, timeout).await
    }

    pub async fn length(&self, addr: &NodeAddress) -> i64 {
        self.queue.length(addr).await
    }

    pub async fn clear(&self, addr: &NodeAddress) {
        self.queue.clear(addr).await
    }

    pub async fn truncate(&self, addr: &NodeAddress, max_len: usize) {
        self.queue.truncate(addr, max_len).await
    }

    // --- Composite operations ---

    /// Routes `payload` to the node owning `peer_id`.
    ///
    /// Returns the node the message was queued for, or `None` if the peer could not be
    /// resolved (unknown, expired, or the lookup failed).
    pub async fn deliver(&self, peer_id: &PeerId, payload: &[u8]) -> Option<NodeAddress> {
        let Some(target) = self.resolve_peer_address(peer_id).await else {
            tracing::debug!("Dropping message for unreachable peer {}", peer_id);
            return None;
        };

        self.queue.enqueue(&target, payload).await;
        Some(target)
    }

    pub fn heartbeat(&self, interval: Duration) -> Arc<Heartbeat> {
        Heartbeat::new(self.peers.clone(), self.registry.clone(), interval)
    }

    /// Builds the consumer for this node's own queue.
    pub fn consumer<F, Fut>(&self, poll_timeout: Duration, handler: F) -> Arc<QueueConsumer>
    where
        F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        QueueConsumer::new(
            self.queue.clone(),
            self.breaker.clone(),
            self.address.clone(),
            poll_timeout,
            handler,
        )
    }

    /// Detaches every local peer. Called on graceful shutdown.
    pub async fn detach_all(&self) {
        let ids = self.peers.ids();
        for peer_id in &ids {
            self.peers.detach(peer_id).await;
        }
        tracing::info!("Detached {} local peers", ids.len());
    }
}
