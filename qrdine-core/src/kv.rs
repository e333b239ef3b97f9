//! TTL'd key-value collaborator
//!
//! Backs the idempotency reservations/results and the per-cart advisory
//! locks. The trait is the seam: production deployments point it at a
//! shared store, tests and single-node embeddings use [`MemoryKv`].

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::core::AppResult;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Set `key` only if absent (or expired). Returns whether the write
    /// happened. This is the compare-and-set primitive locks and
    /// reservations are built on.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Read a live (non-expired) value.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Unconditionally set `key` with an expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete `key` if present.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

/// In-process `KvStore` with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, Entry>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        // The DashMap entry API holds the shard lock across the check
        // and insert, which makes this atomic.
        match self.entries.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(Entry::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, ttl));
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.entries.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_nx_reserves_only_once() {
        let kv = MemoryKv::new();
        let ttl = Duration::from_secs(5);
        assert!(kv.set_nx("k", "a", ttl).await.unwrap());
        assert!(!kv.set_nx("k", "b", ttl).await.unwrap());
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn expired_keys_are_reclaimable() {
        let kv = MemoryKv::new();
        let ttl = Duration::from_millis(20);
        assert!(kv.set_nx("k", "a", ttl).await.unwrap());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(kv.set_nx("k", "b", Duration::from_secs(5)).await.unwrap());
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn delete_frees_the_key() {
        let kv = MemoryKv::new();
        kv.set("k", "a", Duration::from_secs(5)).await.unwrap();
        kv.delete("k").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(kv.set_nx("k", "b", Duration::from_secs(5)).await.unwrap());
    }
}
