//! Queue Consumer
//!
//! Drains this node's inbox and hands every payload to a handler.
//!
//! ## Responsibilities
//! - **Polling**: re-issues a bounded blocking pop in a loop, so no call outlives its timeout.
//! - **Dispatch**: invokes the registered async handler, typically "write to the local
//!   connection of the addressed peer".
//! - **Backoff**: while the store is considered unavailable, sleeps with jitter between
//!   polls instead of spinning on immediate failures.

use super::service::MessageQueue;
use crate::breaker::AvailabilityBreaker;
use crate::node::types::NodeAddress;

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5);
const UNAVAILABLE_BACKOFF: Duration = Duration::from_millis(500);

/// Type-erased async handler for one dequeued payload.
pub type MessageHandlerFn =
    Arc<dyn Fn(Vec<u8>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

pub struct QueueConsumer {
    queue: Arc<MessageQueue>,
    breaker: Arc<AvailabilityBreaker>,
    addr: NodeAddress,
    poll_timeout: Duration,
    handler: MessageHandlerFn,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl QueueConsumer {
    pub fn new<F, Fut>(
        queue: Arc<MessageQueue>,
        breaker: Arc<AvailabilityBreaker>,
        addr: NodeAddress,
        poll_timeout: Duration,
        handler: F,
    ) -> Arc<Self>
    where
        F: Fn(Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler: MessageHandlerFn = Arc::new(move |message: Vec<u8>| {
            Box::pin(handler(message)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        });

        Arc::new(Self {
            queue,
            breaker,
            addr,
            poll_timeout,
            handler,
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    /// Spawns the consume loop. Abort the returned handle to stop it.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tracing::info!("Starting queue consumer for {}", self.addr);
        tokio::spawn(async move {
            self.consume_loop().await;
        })
    }

    async fn consume_loop(&self) {
        loop {
            let handled = self.poll_once().await;

            if !handled && !self.breaker.is_available() {
                let jitter = rand::random::<u64>() % 250;
                tokio::time::sleep(UNAVAILABLE_BACKOFF + Duration::from_millis(jitter)).await;
            }
        }
    }

    /// Waits for one message and dispatches it. Returns whether a message was handled.
    pub async fn poll_once(&self) -> bool {
        let Some(message) = self
            .queue
            .dequeue_blocking(&self.addr, self.poll_timeout)
            .await
        else {
            return false;
        };

        let size = message.len();
        match (self.handler)(message).await {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Dispatched {} byte message", size);
            }
            Err(e) => {
                // Already popped: the message is dropped, matching best-effort delivery.
                self.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Handler failed for {} byte message: {}", size, e);
            }
        }
        true
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
