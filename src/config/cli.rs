//! Command-line flags and their environment fallbacks.

use super::BrokerConfig;
use crate::store::types::{DEFAULT_REDIS_PORT, StoreConfig};

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "signal-broker",
    about = "Presence and message routing node for the signaling cluster"
)]
pub struct Cli {
    /// JSON config file. Flags below override its values.
    #[arg(long, env = "SIGNAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Single Redis instance host.
    #[arg(long, env = "SIGNAL_REDIS_HOST", conflicts_with_all = ["cluster", "memory"])]
    pub redis_host: Option<String>,

    #[arg(long, env = "SIGNAL_REDIS_PORT", conflicts_with_all = ["cluster", "memory"])]
    pub redis_port: Option<u16>,

    #[arg(long, env = "SIGNAL_REDIS_USERNAME", conflicts_with = "memory")]
    pub redis_username: Option<String>,

    #[arg(
        long,
        env = "SIGNAL_REDIS_PASSWORD",
        hide_env_values = true,
        conflicts_with = "memory"
    )]
    pub redis_password: Option<String>,

    #[arg(long, env = "SIGNAL_REDIS_DB", conflicts_with_all = ["cluster", "memory"])]
    pub redis_db: Option<i64>,

    /// Redis cluster seed nodes (`host:port`), repeatable or comma separated.
    #[arg(long, env = "SIGNAL_REDIS_CLUSTER", value_delimiter = ',', conflicts_with = "memory")]
    pub cluster: Vec<String>,

    /// Use an in-process store (single node only).
    #[arg(long)]
    pub memory: bool,

    /// Admin HTTP API bind address.
    #[arg(long, env = "SIGNAL_HTTP_ADDR")]
    pub http: Option<SocketAddr>,

    #[arg(long, env = "SIGNAL_HEARTBEAT_SECS")]
    pub heartbeat_secs: Option<u64>,

    /// Upper bound of one blocking pop on this node's queue.
    #[arg(long, env = "SIGNAL_CONSUMER_TIMEOUT_SECS")]
    pub consumer_timeout_secs: Option<u64>,

    #[arg(long, env = "SIGNAL_PEER_CACHE_CAPACITY")]
    pub peer_cache_capacity: Option<usize>,

    #[arg(long, env = "SIGNAL_PEER_CACHE_TTL_SECS")]
    pub peer_cache_ttl_secs: Option<u64>,
}

impl Cli {
    /// Merges the flags over the config file (or defaults).
    ///
    /// A topology flag (`--memory`, `--cluster`, `--redis-host`) replaces the configured
    /// store. Otherwise connection flags are applied to the configured store in place.
    pub fn into_config(self) -> Result<BrokerConfig> {
        let mut config = match &self.config {
            Some(path) => BrokerConfig::from_json_file(path)?,
            None => BrokerConfig::default(),
        };

        if self.memory {
            config.store = StoreConfig::Memory;
        } else if !self.cluster.is_empty() {
            config.store = StoreConfig::Cluster {
                addrs: self.cluster,
                username: self.redis_username,
                password: self.redis_password,
            };
        } else if let Some(host) = self.redis_host {
            config.store = StoreConfig::Single {
                host,
                port: self.redis_port.unwrap_or(DEFAULT_REDIS_PORT),
                username: self.redis_username,
                password: self.redis_password,
                db: self.redis_db.unwrap_or(0),
            };
        } else {
            match &mut config.store {
                StoreConfig::Single {
                    port,
                    username,
                    password,
                    db,
                    ..
                } => {
                    if let Some(value) = self.redis_port {
                        *port = value;
                    }
                    if let Some(value) = self.redis_db {
                        *db = value;
                    }
                    if self.redis_username.is_some() {
                        *username = self.redis_username;
                    }
                    if self.redis_password.is_some() {
                        *password = self.redis_password;
                    }
                }
                StoreConfig::Cluster {
                    username, password, ..
                } => {
                    if self.redis_port.is_some() || self.redis_db.is_some() {
                        anyhow::bail!("--redis-port and --redis-db do not apply to a cluster");
                    }
                    if self.redis_username.is_some() {
                        *username = self.redis_username;
                    }
                    if self.redis_password.is_some() {
                        *password = self.redis_password;
                    }
                }
                StoreConfig::Memory => {
                    if self.redis_port.is_some()
                        || self.redis_db.is_some()
                        || self.redis_username.is_some()
                        || self.redis_password.is_some()
                    {
                        anyhow::bail!("Redis connection flags given but the store is in-memory");
                    }
                }
            }
        }

        if let Some(http) = self.http {
            config.http_addr = http;
        }
        if let Some(secs) = self.heartbeat_secs {
            config.heartbeat_interval_secs = secs;
        }
        if let Some(secs) = self.consumer_timeout_secs {
            config.consumer_timeout_secs = secs;
        }
        if let Some(capacity) = self.peer_cache_capacity {
            config.peer_cache_capacity = capacity;
        }
        if self.peer_cache_ttl_secs.is_some() {
            config.peer_cache_ttl_secs = self.peer_cache_ttl_secs;
        }

        Ok(config)
    }
}
