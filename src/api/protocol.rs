//! Admin API Protocol
//!
//! Endpoint paths and the JSON bodies exchanged with operators. Message payloads are
//! never wrapped: push and deliver take the raw request body as the opaque message, and an
//! empty body is a valid message.

use crate::node::types::NodeAddress;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

pub const ENDPOINT_HEALTH: &str = "/health";
/// Resolve (GET), attach (POST) or detach (DELETE) a peer.
pub const ENDPOINT_PEER: &str = "/peers/:peer_id";
pub const ENDPOINT_NODE_CLIENTS: &str = "/nodes/:addr/clients";
pub const ENDPOINT_QUEUE_LEN: &str = "/queues/:addr/len";
pub const ENDPOINT_QUEUE_PUSH: &str = "/queues/:addr/push";
pub const ENDPOINT_QUEUE_CLEAR: &str = "/queues/:addr/clear";
pub const ENDPOINT_QUEUE_TRUNCATE: &str = "/queues/:addr/truncate";
/// Route a raw payload to whichever node owns the peer.
pub const ENDPOINT_DELIVER: &str = "/deliver/:peer_id";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub address: NodeAddress,
    pub store_available: bool,
    pub local_peers: usize,
}

/// `node` is `None` when the peer is unknown, expired, or the lookup failed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub peer_id: String,
    pub node: Option<NodeAddress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttachResponse {
    pub peer_id: String,
    pub node: NodeAddress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetachResponse {
    /// Whether the peer was attached to this node.
    pub detached: bool,
}

/// `count` is -1 when the node has not published recently or the store is unreachable.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientCountResponse {
    pub node: NodeAddress,
    pub count: i64,
}

/// `length` is -1 when the store is unreachable.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueLengthResponse {
    pub node: NodeAddress,
    pub length: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TruncateRequest {
    pub max_len: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeliverResponse {
    pub delivered: bool,
    pub node: Option<NodeAddress>,
}
