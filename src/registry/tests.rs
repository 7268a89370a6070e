#[cfg(test)]
mod tests {
    use crate::breaker::AvailabilityBreaker;
    use crate::node::types::NodeAddress;
    use crate::registry::service::{CLIENT_ALIVE_EXPIRE_DURATION, NodeRegistry, UNKNOWN_COUNT};
    use crate::store::client::KvStore;
    use crate::store::keys::stats_key;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn registry(store: &Arc<MemoryStore>, addr: &str) -> (NodeRegistry, Arc<AvailabilityBreaker>) {
        let breaker = AvailabilityBreaker::new();
        breaker.mark_available();
        (
            NodeRegistry::new(store.clone(), breaker.clone(), NodeAddress::from(addr)),
            breaker,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_published_count_visible_until_ttl() {
        // ARRANGE
        let store = MemoryStore::new();
        let (node_a, _) = registry(&store, "nodeA");
        let (node_b, _) = registry(&store, "nodeB");
        let addr_a = NodeAddress::from("nodeA");

        // ACT
        node_a.publish_client_count(5).await;

        // ASSERT: any node reads it
        assert_eq!(node_a.query_node_client_count(&addr_a).await, 5);
        assert_eq!(node_b.query_node_client_count(&addr_a).await, 5);

        // ASSERT: it disappears once nobody republishes
        tokio::time::advance(CLIENT_ALIVE_EXPIRE_DURATION).await;
        assert_eq!(node_b.query_node_client_count(&addr_a).await, UNKNOWN_COUNT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_republishing_keeps_record_alive() {
        let store = MemoryStore::new();
        let (node_a, _) = registry(&store, "nodeA");
        let addr_a = NodeAddress::from("nodeA");

        for count in 1..=5 {
            node_a.publish_client_count(count).await;
            tokio::time::advance(Duration::from_secs(15)).await;
        }

        assert_eq!(node_a.query_node_client_count(&addr_a).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_node_reports_sentinel() {
        let store = MemoryStore::new();
        let (node_a, breaker) = registry(&store, "nodeA");

        let count = node_a
            .query_node_client_count(&NodeAddress::from("never-seen"))
            .await;

        assert_eq!(count, UNKNOWN_COUNT);
        assert!(breaker.is_available(), "absence must not trip the breaker");
    }

    #[tokio::test]
    async fn test_garbage_count_reports_sentinel() {
        let store = MemoryStore::new();
        let (node_a, _) = registry(&store, "nodeA");
        let addr = NodeAddress::from("nodeX");
        store
            .set_ex(&stats_key(&addr), "lots", Duration::from_secs(20))
            .await
            .unwrap();

        assert_eq!(node_a.query_node_client_count(&addr).await, UNKNOWN_COUNT);
    }

    #[tokio::test]
    async fn test_failed_query_trips_breaker() {
        let store = MemoryStore::new();
        let (node_a, breaker) = registry(&store, "nodeA");
        node_a.publish_client_count(3).await;

        store.set_failing(true);
        let count = node_a
            .query_node_client_count(&NodeAddress::from("nodeA"))
            .await;

        assert_eq!(count, UNKNOWN_COUNT);
        assert!(!breaker.is_available());
    }

    #[tokio::test]
    async fn test_publish_is_attempted_while_unavailable() {
        let store = MemoryStore::new();
        let (node_a, breaker) = registry(&store, "nodeA");

        breaker.trip();
        node_a.publish_client_count(7).await;

        assert_eq!(
            store.get(&stats_key(&NodeAddress::from("nodeA"))).await.unwrap(),
            Some("7".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_publish_trips_breaker() {
        let store = MemoryStore::new();
        let (node_a, breaker) = registry(&store, "nodeA");

        store.set_failing(true);
        node_a.publish_client_count(1).await;

        assert!(!breaker.is_available());
    }
}
