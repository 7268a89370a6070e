use crate::breaker::AvailabilityBreaker;
use crate::node::types::NodeAddress;
use crate::store::client::KvStore;
use crate::store::keys::queue_key;

use std::sync::Arc;
use std::time::Duration;

/// Returned by `length` when the queue could not be read.
pub const UNKNOWN_LENGTH: i64 = -1;

pub struct MessageQueue {
    store: Arc<dyn KvStore>,
    breaker: Arc<AvailabilityBreaker>,
}

impl MessageQueue {
    pub fn new(store: Arc<dyn KvStore>, breaker: Arc<AvailabilityBreaker>) -> Self {
        Self { store, breaker }
    }

    /// Appends `message` to the tail of `addr`'s queue.
    ///
    /// Best-effort and ungated. The push is awaited before returning so that messages
    /// sent one after another by the same task keep their order.
    pub async fn enqueue(&self, addr: &NodeAddress, message: &[u8]) {
        match self.store.rpush(&queue_key(addr), message).await {
            Ok(()) => tracing::trace!("Queued {} bytes for {}", message.len(), addr),
            Err(e) => self.breaker.report("RPUSH", &e),
        }
    }

    /// Pops the head of `addr`'s queue, waiting up to `timeout`.
    ///
    /// `None` means either nothing arrived in time or the store failed.
    pub async fn dequeue_blocking(&self, addr: &NodeAddress, timeout: Duration) -> Option<Vec<u8>> {
        match self.store.blpop(&queue_key(addr), timeout).await {
            Ok(message) => message,
            Err(e) => {
                self.breaker.report("BLPOP", &e);
                None
            }
        }
    }

    pub async fn length(&self, addr: &NodeAddress) -> i64 {
        match self.store.llen(&queue_key(addr)).await {
            Ok(len) => len,
            Err(e) => {
                self.breaker.report("LLEN", &e);
                UNKNOWN_LENGTH
            }
        }
    }

    /// Drops every queued message.
    pub async fn clear(&self, addr: &NodeAddress) {
        match self.store.ltrim(&queue_key(addr), 1, 0).await {
            Ok(()) => tracing::info!("Cleared queue of {}", addr),
            Err(e) => self.breaker.report("LTRIM clear", &e),
        }
    }

    /// Keeps only the newest `max_len` messages.
    pub async fn truncate(&self, addr: &NodeAddress, max_len: usize) {
        if max_len == 0 {
            // LTRIM key -0 -1 would keep the whole list.
            self.clear(addr).await;
            return;
        }

        let start = -(max_len.min(isize::MAX as usize) as isize);
        match self.store.ltrim(&queue_key(addr), start, -1).await {
            Ok(()) => tracing::info!("Truncated queue of {} to {} messages", addr, max_len),
            Err(e) => self.breaker.report("LTRIM truncate", &e),
        }
    }
}
