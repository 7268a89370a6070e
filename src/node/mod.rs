//! Node Identity Module
//!
//! Every process taking part in signaling is a *node*. A node is identified by its
//! `NodeAddress`, which is derived once at startup from the host's network identity and the
//! process id. The same string is used as the key suffix for the node's stats record and
//! message queue, and as the value stored in peer directory records.

pub mod types;
