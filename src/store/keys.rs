//! Key layout in the shared store.
//!
//! Prefixes match the keys already used by deployed signaling nodes, so mixed fleets
//! can share one store.

use crate::node::types::NodeAddress;

pub const PEER_KEY_PREFIX: &str = "signal:peerId:";
pub const STATS_KEY_PREFIX: &str = "signal:stats:count:";
pub const QUEUE_KEY_PREFIX: &str = "signal:mq:";

pub fn peer_key(peer_id: &str) -> String {
    format!("{}{}", PEER_KEY_PREFIX, peer_id)
}

pub fn stats_key(addr: &NodeAddress) -> String {
    format!("{}{}", STATS_KEY_PREFIX, addr)
}

pub fn queue_key(addr: &NodeAddress) -> String {
    format!("{}{}", QUEUE_KEY_PREFIX, addr)
}
