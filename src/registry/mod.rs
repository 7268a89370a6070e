//! Node Registry Module
//!
//! Per-node liveness and load publication. Each node writes its connected-client count to
//! `signal:stats:count:<node>` with a 20 second TTL and republishes on a shorter interval.
//! A missing record means the node is dead or not reporting; readers cannot tell that
//! apart from a failed lookup and get the `UNKNOWN_COUNT` sentinel for both.

pub mod service;

#[cfg(test)]
mod tests;
