//! Signal Broker Library
//!
//! Cluster-wide presence and message routing for a horizontally scaled signaling service.
//! Every node shares one Redis (single instance or cluster) and uses it to find which node
//! a peer is connected to, to publish its own load, and to receive messages through its
//! own FIFO inbox.
//!
//! ## Modules
//! - **`store`**: the key-value client (`RedisStore`, `MemoryStore`) and key layout.
//! - **`breaker`**: the store availability breaker guarding directory writes.
//! - **`directory`**: peer → node registrations with a local LRU cache.
//! - **`registry`**: per-node published client counts.
//! - **`queue`**: per-node message inboxes and the consume loop.
//! - **`presence`**: locally attached peers and the heartbeat that keeps them alive.
//! - **`broker`**: the facade wiring everything around one store connection.
//! - **`node`**: node identity.
//! - **`config`**: file, flag and environment configuration.
//! - **`api`**: the admin HTTP API.

pub mod api;
pub mod breaker;
pub mod broker;
pub mod config;
pub mod directory;
pub mod node;
pub mod presence;
pub mod queue;
pub mod registry;
pub mod store;
