//! Shared Store Adapter
//!
//! Thin capability layer over the shared key-value store that every node talks to.
//! The coordination components never speak the Redis protocol directly; they go through
//! the `KvStore` trait, which keeps them testable against an in-process store.
//!
//! ## Implementations
//! - **`RedisStore`**: single-instance (`ConnectionManager`) or cluster (`ClusterConnection`)
//!   topology. Ordinary commands share one connection; every blocking pop opens its own.
//! - **`MemoryStore`**: DashMap-backed store with TTLs and blocking pops. Used for local
//!   single-node runs and as the fault-injectable fake in tests.
//!
//! No retries happen here. Errors are returned to the caller, which decides whether to
//! trip the availability breaker.

pub mod client;
pub mod keys;
pub mod memory;
pub mod types;
