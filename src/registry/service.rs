use crate::breaker::AvailabilityBreaker;
use crate::node::types::NodeAddress;
use crate::store::client::KvStore;
use crate::store::keys::stats_key;

use std::sync::Arc;
use std::time::Duration;

pub const CLIENT_ALIVE_EXPIRE_DURATION: Duration = Duration::from_secs(20);

/// Returned when a node's client count is absent, unparsable or could not be read.
pub const UNKNOWN_COUNT: i64 = -1;

pub struct NodeRegistry {
    store: Arc<dyn KvStore>,
    breaker: Arc<AvailabilityBreaker>,
    self_addr: NodeAddress,
}

impl NodeRegistry {
    pub fn new(
        store: Arc<dyn KvStore>,
        breaker: Arc<AvailabilityBreaker>,
        self_addr: NodeAddress,
    ) -> Self {
        Self {
            store,
            breaker,
            self_addr,
        }
    }

    pub fn self_address(&self) -> &NodeAddress {
        &self.self_addr
    }

    /// Publishes this node's client count.
    ///
    /// Not gated by the breaker: the stats record doubles as the node's liveness signal,
    /// so it is attempted on every tick. Failures still trip the breaker.
    pub async fn publish_client_count(&self, count: usize) {
        let key = stats_key(&self.self_addr);
        match self
            .store
            .set_ex(&key, &count.to_string(), CLIENT_ALIVE_EXPIRE_DURATION)
            .await
        {
            Ok(()) => tracing::trace!("Published client count {} for {}", count, self.self_addr),
            Err(e) => self.breaker.report("SET stats", &e),
        }
    }

    /// Reads the client count last published by `addr`, or `UNKNOWN_COUNT`.
    pub async fn query_node_client_count(&self, addr: &NodeAddress) -> i64 {
        match self.store.get(&stats_key(addr)).await {
            Ok(Some(raw)) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!("Node {} published a non-numeric client count: {:?}", addr, raw);
                UNKNOWN_COUNT
            }),
            Ok(None) => {
                tracing::debug!("No client count published by {}", addr);
                UNKNOWN_COUNT
            }
            Err(e) => {
                self.breaker.report("GET stats", &e);
                UNKNOWN_COUNT
            }
        }
    }
}
