//! Directory Module Tests
//!
//! Two `PeerDirectory` instances sharing one `MemoryStore` stand in for two nodes talking
//! to the same Redis.
//!
//! ## Test Scopes
//! - **Resolution**: local and cross-node lookups, TTL expiry, deregistration.
//! - **Cache**: hit short-circuit, LRU bounds, absence not cached, optional TTL.
//! - **Breaker**: gated writes, failed lookups trip the breaker.

#[cfg(test)]
mod tests {
    use crate::breaker::AvailabilityBreaker;
    use crate::directory::cache::PeerCache;
    use crate::directory::service::{PEER_EXPIRE_DURATION, PeerDirectory};
    use crate::directory::types::PeerId;
    use crate::node::types::NodeAddress;
    use crate::store::client::KvStore;
    use crate::store::keys::peer_key;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn node(store: &Arc<MemoryStore>, addr: &str) -> (PeerDirectory, Arc<AvailabilityBreaker>) {
        let breaker = AvailabilityBreaker::new();
        breaker.mark_available();
        let directory = PeerDirectory::new(
            store.clone(),
            breaker.clone(),
            NodeAddress::from(addr),
            PeerCache::new(1_000, None),
        );
        (directory, breaker)
    }

    // ============================================================
    // RESOLUTION
    // ============================================================

    #[tokio::test]
    async fn test_registered_peer_resolves_to_registering_node() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;

        assert_eq!(
            node_a.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );
    }

    #[tokio::test]
    async fn test_cross_node_resolution_reads_shared_store() {
        // ARRANGE: p1 attaches to nodeA
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("p1");
        node_a.register_local_peer(&peer).await;

        // ACT: nodeB's cache is cold
        assert!(node_b.cache().is_empty());
        let reads_before = store.read_count();
        let resolved = node_b.resolve_peer_address(&peer).await;

        // ASSERT
        assert_eq!(resolved, Some(NodeAddress::from("nodeA")));
        assert_eq!(store.read_count(), reads_before + 1);
        assert_eq!(node_b.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_deregistered_peer_is_not_found_on_cache_miss() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;
        node_a.deregister_local_peer(&peer).await;

        assert_eq!(node_b.resolve_peer_address(&peer).await, None);
    }

    #[tokio::test]
    async fn test_unknown_peer_is_not_cached() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("late");

        assert_eq!(node_b.resolve_peer_address(&peer).await, None);
        assert!(node_b.cache().is_empty());

        // The peer shows up later and is found straight away.
        node_a.register_local_peer(&peer).await;
        assert_eq!(
            node_b.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_peer_record_expires_without_refresh() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;
        tokio::time::advance(PEER_EXPIRE_DURATION).await;

        assert_eq!(node_b.resolve_peer_address(&peer).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_keeps_peer_record_alive() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;
        for _ in 0..3 {
            tokio::time::advance(PEER_EXPIRE_DURATION - Duration::from_secs(60)).await;
            node_a.refresh_local_peer_ttl(&peer).await;
        }

        assert_eq!(
            node_b.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );
        assert_eq!(store.ttl(&peer_key("p1")), Some(PEER_EXPIRE_DURATION));
    }

    #[tokio::test]
    async fn test_migration_overwrites_record() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let (node_c, _) = node(&store, "nodeC");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;
        node_b.register_local_peer(&peer).await;

        assert_eq!(
            node_c.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeB"))
        );
    }

    // ============================================================
    // CACHE
    // ============================================================

    #[tokio::test]
    async fn test_second_resolution_is_served_from_cache() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let peer = PeerId::from("p1");
        node_a.register_local_peer(&peer).await;

        let first = node_b.resolve_peer_address(&peer).await;
        let reads_after_first = store.read_count();
        let second = node_b.resolve_peer_address(&peer).await;

        assert_eq!(first, second);
        assert_eq!(store.read_count(), reads_after_first, "cache hit touched the store");
    }

    #[tokio::test]
    async fn test_cached_entry_is_served_even_when_stale() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let (node_c, _) = node(&store, "nodeC");
        let peer = PeerId::from("p1");

        node_a.register_local_peer(&peer).await;
        assert_eq!(
            node_c.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );

        // p1 moves to nodeB; nodeC keeps its hint.
        node_b.register_local_peer(&peer).await;
        assert_eq!(
            node_c.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = PeerCache::new(2, None);
        cache.insert(PeerId::from("a"), NodeAddress::from("n1"));
        cache.insert(PeerId::from("b"), NodeAddress::from("n1"));

        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get(&PeerId::from("a")).is_some());
        cache.insert(PeerId::from("c"), NodeAddress::from("n2"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&PeerId::from("a")).is_some());
        assert!(cache.get(&PeerId::from("b")).is_none());
        assert!(cache.get(&PeerId::from("c")).is_some());
    }

    #[test]
    fn test_cache_default_capacity() {
        assert_eq!(PeerCache::default().capacity(), 100_000);
        assert_eq!(PeerCache::new(0, None).capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_turns_old_entries_into_misses() {
        let cache = PeerCache::new(10, Some(Duration::from_secs(30)));
        let peer = PeerId::from("p1");
        cache.insert(peer.clone(), NodeAddress::from("nodeA"));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get(&peer).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&peer).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_resolution_shares_cache() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, _) = node(&store, "nodeB");
        let node_b = Arc::new(node_b);

        for i in 0..50 {
            node_a.register_local_peer(&PeerId::from(format!("peer-{}", i))).await;
        }

        let mut handles = Vec::new();
        for i in 0..50 {
            let node_b = node_b.clone();
            handles.push(tokio::spawn(async move {
                node_b
                    .resolve_peer_address(&PeerId::from(format!("peer-{}", i)))
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(NodeAddress::from("nodeA")));
        }
        assert_eq!(node_b.cache().len(), 50);
    }

    // ============================================================
    // BREAKER INTERACTION
    // ============================================================

    #[tokio::test]
    async fn test_writes_are_skipped_while_unavailable() {
        let store = MemoryStore::new();
        let (node_a, breaker) = node(&store, "nodeA");
        let peer = PeerId::from("p1");

        breaker.trip();
        node_a.register_local_peer(&peer).await;

        assert!(!store.contains_key(&peer_key("p1")));
    }

    #[tokio::test]
    async fn test_deregister_and_refresh_skipped_while_unavailable() {
        let store = MemoryStore::new();
        let (node_a, breaker) = node(&store, "nodeA");
        let peer = PeerId::from("p1");
        node_a.register_local_peer(&peer).await;

        breaker.trip();
        node_a.deregister_local_peer(&peer).await;
        node_a.refresh_local_peer_ttl(&peer).await;

        assert!(store.contains_key(&peer_key("p1")));
    }

    #[tokio::test]
    async fn test_failed_lookup_trips_breaker_and_reports_not_found() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, breaker_b) = node(&store, "nodeB");
        let peer = PeerId::from("p1");
        node_a.register_local_peer(&peer).await;

        store.set_failing(true);
        let resolved = node_b.resolve_peer_address(&peer).await;

        assert_eq!(resolved, None);
        assert!(!breaker_b.is_available());
    }

    #[tokio::test]
    async fn test_cache_hit_survives_store_outage() {
        let store = MemoryStore::new();
        let (node_a, _) = node(&store, "nodeA");
        let (node_b, breaker_b) = node(&store, "nodeB");
        let peer = PeerId::from("p1");
        node_a.register_local_peer(&peer).await;
        node_b.resolve_peer_address(&peer).await;

        store.set_failing(true);

        assert_eq!(
            node_b.resolve_peer_address(&peer).await,
            Some(NodeAddress::from("nodeA"))
        );
        assert!(breaker_b.is_available());
    }

    #[tokio::test]
    async fn test_failed_write_trips_breaker() {
        let store = MemoryStore::new();
        let (node_a, breaker) = node(&store, "nodeA");

        store.set_failing(true);
        node_a.register_local_peer(&PeerId::from("p1")).await;

        assert!(!breaker.is_available());
        store.set_failing(false);
        assert_eq!(store.get(&peer_key("p1")).await.unwrap(), None);
    }
}
