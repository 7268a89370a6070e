//! Configuration Module
//!
//! Node settings come from a JSON file, CLI flags and `SIGNAL_*` environment variables,
//! in that order of increasing precedence. The store topology is the only required piece;
//! everything else has defaults tuned to the TTLs used in the shared store.

pub mod cli;

use crate::broker::BrokerOptions;
use crate::breaker::BREAK_DURATION;
use crate::directory::cache::PEER_CACHE_CAPACITY;
use crate::directory::service::PEER_EXPIRE_DURATION;
use crate::presence::service::DEFAULT_HEARTBEAT_INTERVAL;
use crate::queue::consumer::DEFAULT_POLL_TIMEOUT;
use crate::registry::service::CLIENT_ALIVE_EXPIRE_DURATION;
use crate::store::types::StoreConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrokerConfig {
    pub store: StoreConfig,
    /// Admin HTTP API bind address.
    pub http_addr: SocketAddr,
    pub heartbeat_interval_secs: u64,
    pub consumer_timeout_secs: u64,
    pub peer_cache_capacity: usize,
    pub peer_cache_ttl_secs: Option<u64>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            http_addr: SocketAddr::from(([127, 0, 0, 1], 7070)),
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL.as_secs(),
            consumer_timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
            peer_cache_capacity: PEER_CACHE_CAPACITY,
            peer_cache_ttl_secs: None,
        }
    }
}

impl BrokerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if let StoreConfig::Cluster { addrs, .. } = &self.store
            && addrs.is_empty()
        {
            anyhow::bail!("Cluster topology needs at least one seed address");
        }

        if let StoreConfig::Single { host, .. } = &self.store
            && host.trim().is_empty()
        {
            anyhow::bail!("Store host must not be empty");
        }

        let heartbeat = self.heartbeat_interval();
        if heartbeat.is_zero() {
            anyhow::bail!("Heartbeat interval must be positive");
        }
        if heartbeat >= CLIENT_ALIVE_EXPIRE_DURATION || heartbeat >= PEER_EXPIRE_DURATION {
            anyhow::bail!(
                "Heartbeat interval {:?} must be shorter than the stats TTL {:?}",
                heartbeat,
                CLIENT_ALIVE_EXPIRE_DURATION
            );
        }

        if self.consumer_timeout_secs == 0 {
            anyhow::bail!("Consumer timeout must be positive");
        }

        if self.peer_cache_capacity == 0 {
            anyhow::bail!("Peer cache capacity must be positive");
        }

        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn consumer_timeout(&self) -> Duration {
        Duration::from_secs(self.consumer_timeout_secs)
    }

    pub fn broker_options(&self) -> BrokerOptions {
        BrokerOptions {
            peer_cache_capacity: self.peer_cache_capacity,
            peer_cache_ttl: self.peer_cache_ttl_secs.map(Duration::from_secs),
            break_duration: BREAK_DURATION,
        }
    }
}

#[cfg(test)]
mod tests;
