use serde::{Deserialize, Serialize};

pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Topology of the shared store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// A single Redis instance.
    Single {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
        username: Option<String>,
        password: Option<String>,
        #[serde(default)]
        db: i64,
    },

    /// A Redis cluster reached through a list of seed nodes (`host:port` or `redis://` URLs).
    Cluster {
        addrs: Vec<String>,
        username: Option<String>,
        password: Option<String>,
    },

    /// In-process store. Only useful for a single node.
    Memory,
}

fn default_port() -> u16 {
    DEFAULT_REDIS_PORT
}

impl StoreConfig {
    pub fn single(host: impl Into<String>, port: u16) -> Self {
        StoreConfig::Single {
            host: host.into(),
            port,
            username: None,
            password: None,
            db: 0,
        }
    }

    /// Short human-readable description, never includes credentials.
    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Single { host, port, db, .. } => {
                format!("redis://{}:{}/{}", host, port, db)
            }
            StoreConfig::Cluster { addrs, .. } => format!("redis cluster {:?}", addrs),
            StoreConfig::Memory => "in-memory store".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::single("127.0.0.1", DEFAULT_REDIS_PORT)
    }
}
