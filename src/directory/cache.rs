//! Bounded peer → node cache.

use super::types::PeerId;
use crate::node::types::NodeAddress;

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

pub const PEER_CACHE_CAPACITY: usize = 100_000;

#[derive(Debug, Clone)]
struct CachedAddress {
    addr: NodeAddress,
    cached_at: Instant,
}

/// LRU cache of last-known peer owners, shared by all resolving tasks.
///
/// Entries never expire unless a `ttl` is configured; when one is, entries older than it
/// are treated as misses and dropped on access.
pub struct PeerCache {
    entries: Mutex<LruCache<PeerId, CachedAddress>>,
    ttl: Option<Duration>,
}

impl PeerCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<NodeAddress> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let cached = entries.get(peer_id)?.clone();
        if let Some(ttl) = self.ttl
            && cached.cached_at.elapsed() >= ttl
        {
            entries.pop(peer_id);
            return None;
        }

        Some(cached.addr)
    }

    pub fn insert(&self, peer_id: PeerId, addr: NodeAddress) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.put(
            peer_id,
            CachedAddress {
                addr,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cap()
            .get()
    }
}

impl Default for PeerCache {
    fn default() -> Self {
        Self::new(PEER_CACHE_CAPACITY, None)
    }
}
