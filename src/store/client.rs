//! Store Client
//!
//! Defines the `KvStore` capability used by the coordination layer and its Redis-backed
//! implementation.

use super::types::StoreConfig;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::{ClusterClient, ClusterClientBuilder};
use redis::cluster_async::ClusterConnection;
use redis::{ConnectionAddr, ConnectionInfo, FromRedisValue, RedisConnectionInfo};
use std::time::Duration;

/// The subset of key-value operations the coordination protocol needs.
///
/// String values carry node addresses and counters; list values carry opaque message
/// payloads.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Sets `key` to `value`, expiring after `ttl` (whole seconds, at least one).
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn del(&self, key: &str) -> Result<()>;

    /// Resets the expiry of an existing key without touching its value.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Appends to the tail of the list at `key`, creating it if needed.
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Keeps only the inclusive range `start..=stop`. Negative indexes count from the tail.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()>;

    /// Pops the head of the list, waiting up to `timeout` for one to arrive.
    /// `Ok(None)` means the wait timed out.
    async fn blpop(&self, key: &str, timeout: Duration) -> Result<Option<Vec<u8>>>;

    async fn llen(&self, key: &str) -> Result<i64>;
}

pub(crate) fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

impl Connection {
    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> redis::RedisResult<T> {
        match self {
            Connection::Single(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
            Connection::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
        }
    }
}

/// Source of connections for blocking pops.
///
/// A pending `BLPOP` stalls every other command on its connection, so each blocking call
/// gets a connection of its own.
#[derive(Clone)]
enum BlockingClient {
    Single(redis::Client),
    Cluster(ClusterClient),
}

impl BlockingClient {
    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> redis::RedisResult<T> {
        match self {
            BlockingClient::Single(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                cmd.query_async(&mut conn).await
            }
            BlockingClient::Cluster(client) => {
                let mut conn = client.get_async_connection().await?;
                cmd.query_async(&mut conn).await
            }
        }
    }
}

/// `KvStore` backed by Redis.
///
/// Ordinary commands share one multiplexed connection. Blocking pops open a connection
/// per call, so concurrent pops on different queues never wait on each other and never
/// delay peer lookups or stats publication.
pub struct RedisStore {
    commands: Connection,
    blocking: BlockingClient,
    description: String,
}

impl RedisStore {
    /// Connects to the topology described by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let description = config.describe();

        let (commands, blocking) = match config {
            StoreConfig::Single {
                host,
                port,
                username,
                password,
                db,
            } => {
                let info = ConnectionInfo {
                    addr: ConnectionAddr::Tcp(host.clone(), *port),
                    redis: RedisConnectionInfo {
                        db: *db,
                        username: username.clone(),
                        password: password.clone(),
                        ..Default::default()
                    },
                };
                let client = redis::Client::open(info)
                    .with_context(|| format!("Invalid store address {}", description))?;

                let commands = ConnectionManager::new(client.clone())
                    .await
                    .with_context(|| format!("Failed to connect to {}", description))?;

                (Connection::Single(commands), BlockingClient::Single(client))
            }

            StoreConfig::Cluster {
                addrs,
                username,
                password,
            } => {
                if addrs.is_empty() {
                    anyhow::bail!("Cluster topology needs at least one seed address");
                }

                let nodes: Vec<String> = addrs.iter().map(|addr| cluster_node_url(addr)).collect();
                let mut builder = ClusterClientBuilder::new(nodes);
                if let Some(username) = username {
                    builder = builder.username(username.clone());
                }
                if let Some(password) = password {
                    builder = builder.password(password.clone());
                }
                let client = builder
                    .build()
                    .with_context(|| format!("Invalid cluster config {}", description))?;

                let commands = client
                    .get_async_connection()
                    .await
                    .with_context(|| format!("Failed to connect to {}", description))?;

                (Connection::Cluster(commands), BlockingClient::Cluster(client))
            }

            StoreConfig::Memory => {
                anyhow::bail!("In-memory topology is served by MemoryStore, not RedisStore")
            }
        };

        tracing::info!("Connected to {}", description);

        Ok(Self {
            commands,
            blocking,
            description,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

fn cluster_node_url(addr: &str) -> String {
    if addr.starts_with("redis://") || addr.starts_with("rediss://") {
        addr.to_string()
    } else {
        format!("redis://{}", addr)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.commands.query(redis::cmd("GET").arg(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let _: () = self
            .commands
            .query(
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(ttl_secs(ttl)),
            )
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let _: () = self.commands.query(redis::cmd("DEL").arg(key)).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let _: () = self
            .commands
            .query(redis::cmd("EXPIRE").arg(key).arg(ttl_secs(ttl)))
            .await?;
        Ok(())
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<()> {
        let _: () = self
            .commands
            .query(redis::cmd("RPUSH").arg(key).arg(value))
            .await?;
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let _: () = self
            .commands
            .query(redis::cmd("LTRIM").arg(key).arg(start).arg(stop))
            .await?;
        Ok(())
    }

    async fn blpop(&self, key: &str, timeout: Duration) -> Result<Option<Vec<u8>>> {
        // BLPOP with a zero timeout blocks forever, so a zero wait is a plain LPOP.
        if timeout.is_zero() {
            let value: Option<Vec<u8>> = self.blocking.query(redis::cmd("LPOP").arg(key)).await?;
            return Ok(value);
        }

        let popped: Option<(String, Vec<u8>)> = self
            .blocking
            .query(redis::cmd("BLPOP").arg(key).arg(timeout.as_secs_f64()))
            .await?;
        Ok(popped.map(|(_, value)| value))
    }

    async fn llen(&self, key: &str) -> Result<i64> {
        let len: i64 = self.commands.query(redis::cmd("LLEN").arg(key)).await?;
        Ok(len)
    }
}
