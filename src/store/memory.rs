//! In-process `KvStore`.
//!
//! Mirrors the Redis semantics the coordination layer relies on: string values with
//! optional expiry, lists with `RPUSH`/`LTRIM`/`BLPOP`/`LLEN`, lazily removed expired keys
//! and `WRONGTYPE` errors on mismatched access. Time is read from `tokio::time`, so tests
//! running on a paused clock can step over TTLs.

use super::client::{KvStore, ttl_secs};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<Vec<u8>>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, Entry>,
    /// One `Notify` per list key with (possibly) waiting poppers.
    waiters: DashMap<String, Arc<Notify>>,
    failing: AtomicBool,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every subsequent operation fail until switched off again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of read operations (`GET`, `LLEN`, `BLPOP`) served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Whether `key` currently holds a live value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.data.contains_key(key)
    }

    /// Remaining time to live of `key`, `None` if absent or persistent.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.purge_if_expired(key);
        let entry = self.data.get(key)?;
        entry
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("store unreachable");
        }
        Ok(())
    }

    fn purge_if_expired(&self, key: &str) {
        let now = Instant::now();
        self.data.remove_if(key, |_, entry| entry.is_expired(now));
    }

    fn waiter(&self, key: &str) -> Arc<Notify> {
        self.waiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    fn pop_front(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.purge_if_expired(key);

        let popped = match self.data.get_mut(key) {
            Some(mut entry) => match &mut entry.value {
                Value::List(list) => list.pop_front(),
                Value::Str(_) => return Err(wrong_type(key)),
            },
            None => None,
        };

        // Redis drops empty lists.
        self.data
            .remove_if(key, |_, entry| matches!(&entry.value, Value::List(list) if list.is_empty()));

        Ok(popped)
    }
}

fn wrong_type(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
        key
    )
}

/// Resolves Redis-style `LTRIM` bounds against a list of `len` items.
/// Returns `None` when the resulting range is empty.
fn trim_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len || stop < 0 {
        return None;
    }

    Some((start as usize, stop as usize))
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.purge_if_expired(key);

        match self.data.get(key) {
            Some(entry) => match &entry.value {
                Value::Str(value) => Ok(Some(value.clone())),
                Value::List(_) => Err(wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check()?;
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs(ttl));
        self.data.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.check()?;
        self.data.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        self.check()?;
        self.purge_if_expired(key);
        if let Some(mut entry) = self.data.get_mut(key) {
            entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs(ttl)));
        }
        Ok(())
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check()?;
        self.purge_if_expired(key);
        {
            let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Entry {
                value: Value::List(VecDeque::new()),
                expires_at: None,
            });
            match &mut entry.value {
                Value::List(list) => list.push_back(value.to_vec()),
                Value::Str(_) => return Err(wrong_type(key)),
            }
        }

        self.waiter(key).notify_waiters();
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        self.check()?;
        self.purge_if_expired(key);

        let emptied = match self.data.get_mut(key) {
            Some(mut entry) => match &mut entry.value {
                Value::List(list) => match trim_range(list.len(), start, stop) {
                    Some((first, last)) => {
                        list.truncate(last + 1);
                        list.drain(..first);
                        list.is_empty()
                    }
                    None => true,
                },
                Value::Str(_) => return Err(wrong_type(key)),
            },
            None => false,
        };

        if emptied {
            self.data.remove(key);
        }
        Ok(())
    }

    async fn blpop(&self, key: &str, timeout: Duration) -> Result<Option<Vec<u8>>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let deadline = Instant::now() + timeout;
        let notify = self.waiter(key);

        loop {
            // Register interest before checking the list so a push in between is not lost.
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(value) = self.pop_front(key)? {
                return Ok(Some(value));
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }

            self.check()?;
        }
    }

    async fn llen(&self, key: &str) -> Result<i64> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.purge_if_expired(key);

        match self.data.get(key) {
            Some(entry) => match &entry.value {
                Value::List(list) => Ok(list.len() as i64),
                Value::Str(_) => Err(wrong_type(key)),
            },
            None => Ok(0),
        }
    }
}
