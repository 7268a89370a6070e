//! Peer Directory Module
//!
//! Maps peer identifiers to the address of the node that currently owns the peer's
//! connection.
//!
//! ## Core Mechanisms
//! - **Peer Records**: `signal:peerId:<peer>` holds the owning node address with a 10 minute
//!   TTL. Attach writes it, detach deletes it, heartbeats refresh the TTL. Last writer wins,
//!   so a peer moving to another node simply overwrites the record.
//! - **Read-through Cache**: resolutions are served from a bounded in-process LRU first.
//!   Cached entries are hints and are never re-validated, so a peer that moved while
//!   cached keeps resolving to its old node until the entry is evicted.
//! - **Breaker Gating**: the three write operations are skipped while the shared store is
//!   considered unavailable.

pub mod cache;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;
