//! Message Queue Module
//!
//! Per-node FIFO inboxes kept in the shared store under `signal:mq:<node>`.
//!
//! ## Delivery Model
//! 1. **Routing**: a sender resolves the target peer's node through the peer directory.
//! 2. **Enqueue**: the opaque payload is appended to that node's list.
//! 3. **Consume**: every node runs a `QueueConsumer` that blocking-pops its own list and
//!    hands each payload to a registered handler, which delivers it to the local connection.
//!
//! Ordering is FIFO per node only. There is no deduplication: a sender retrying after an
//! uncertain failure may cause a duplicate (at-least-once).
//!
//! ## Submodules
//! - **`service`**: push, blocking pop, length, clear and truncate.
//! - **`consumer`**: the per-node consume loop and its handler.

pub mod consumer;
pub mod service;
