use super::cache::PeerCache;
use super::types::PeerId;
use crate::breaker::AvailabilityBreaker;
use crate::node::types::NodeAddress;
use crate::store::client::KvStore;
use crate::store::keys::peer_key;

use std::sync::Arc;
use std::time::Duration;

pub const PEER_EXPIRE_DURATION: Duration = Duration::from_secs(10 * 60);

pub struct PeerDirectory {
    store: Arc<dyn KvStore>,
    breaker: Arc<AvailabilityBreaker>,
    self_addr: NodeAddress,
    cache: PeerCache,
}

impl PeerDirectory {
    pub fn new(
        store: Arc<dyn KvStore>,
        breaker: Arc<AvailabilityBreaker>,
        self_addr: NodeAddress,
        cache: PeerCache,
    ) -> Self {
        Self {
            store,
            breaker,
            self_addr,
            cache,
        }
    }

    pub fn self_address(&self) -> &NodeAddress {
        &self.self_addr
    }

    pub fn cache(&self) -> &PeerCache {
        &self.cache
    }

    /// Records this node as the owner of `peer_id`.
    ///
    /// Best-effort: skipped while the breaker is open. A peer that fails to register is
    /// unreachable until the next attach or heartbeat succeeds.
    pub async fn register_local_peer(&self, peer_id: &PeerId) {
        if !self.breaker.is_available() {
            tracing::debug!("Store unavailable, skipping registration of peer {}", peer_id);
            return;
        }

        let key = peer_key(peer_id.as_str());
        match self
            .store
            .set_ex(&key, self.self_addr.as_str(), PEER_EXPIRE_DURATION)
            .await
        {
            Ok(()) => tracing::debug!("Registered peer {} on {}", peer_id, self.self_addr),
            Err(e) => self.breaker.report("SET peer", &e),
        }
    }

    pub async fn deregister_local_peer(&self, peer_id: &PeerId) {
        if !self.breaker.is_available() {
            tracing::debug!("Store unavailable, skipping deregistration of peer {}", peer_id);
            return;
        }

        let key = peer_key(peer_id.as_str());
        match self.store.del(&key).await {
            Ok(()) => tracing::debug!("Deregistered peer {}", peer_id),
            Err(e) => self.breaker.report("DEL peer", &e),
        }
    }

    /// Pushes the peer record's expiry out by another `PEER_EXPIRE_DURATION`.
    pub async fn refresh_local_peer_ttl(&self, peer_id: &PeerId) {
        if !self.breaker.is_available() {
            return;
        }

        let key = peer_key(peer_id.as_str());
        if let Err(e) = self.store.expire(&key, PEER_EXPIRE_DURATION).await {
            self.breaker.report("EXPIRE peer", &e);
        } else {
            tracing::trace!("Refreshed TTL of peer {}", peer_id);
        }
    }

    /// Finds the node that owns `peer_id`.
    ///
    /// Cache hits are returned without touching the store. Misses read the peer record and
    /// cache it when present. `None` covers both an unknown peer and a failed lookup.
    pub async fn resolve_peer_address(&self, peer_id: &PeerId) -> Option<NodeAddress> {
        if let Some(addr) = self.cache.get(peer_id) {
            tracing::trace!("Resolved peer {} from cache: {}", peer_id, addr);
            return Some(addr);
        }

        let key = peer_key(peer_id.as_str());
        match self.store.get(&key).await {
            Ok(Some(addr)) => {
                let addr = NodeAddress::from(addr);
                self.cache.insert(peer_id.clone(), addr.clone());
                tracing::debug!("Resolved peer {} from store: {}", peer_id, addr);
                Some(addr)
            }
            Ok(None) => {
                tracing::debug!("Peer {} is not registered", peer_id);
                None
            }
            Err(e) => {
                self.breaker.report("GET peer", &e);
                None
            }
        }
    }
}
