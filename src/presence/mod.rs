//! Presence Module
//!
//! Keeps this node's share of the shared state alive.
//!
//! ## Core Mechanisms
//! - **Local Peers**: the set of peers whose connections live on this node. Attach and
//!   detach update the set and the peer directory together.
//! - **Heartbeat**: on a fixed interval (shorter than both TTLs) publishes the local client
//!   count and refreshes the TTL of every attached peer record.
//! - **Resync**: writes skipped or lost while the store was unavailable are repaired on the
//!   first heartbeat after recovery by re-registering every attached peer.

pub mod service;
