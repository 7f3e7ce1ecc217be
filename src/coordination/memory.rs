use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::client::{KvError, KvResult, KvStore};

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// In-memory `KvStore` with real TTL semantics.
///
/// Stands in for etcd in tests: expired entries are invisible to reads and
/// purged lazily, mirroring lease expiry. `remove` lets a test simulate a
/// lease running out without waiting for it.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a key immediately, as if its lease had expired.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> KvResult<String> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        Err(KvError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, value: String) -> KvResult<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: String) -> KvResult<bool> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(MemoryEntry {
                        value,
                        expires_at: None,
                    });
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(MemoryEntry {
                    value,
                    expires_at: None,
                });
                Ok(true)
            }
        }
    }

    async fn put_with_ttl(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn prefix_scan(&self, prefix: &str) -> KvResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && !entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
