//! Idempotent execution of logical write operations
//!
//! Deduplicates a caller-supplied key so network retries of one logical
//! mutation apply at most once, and concurrent callers sharing a key all
//! observe the one authoritative result.
//!
//! # Execution flow
//!
//! ```text
//! execute(key, compute)
//!     ├─ 1. Cached result?            -> replay it
//!     ├─ 2. Reserve key (set_nx, short TTL)
//!     │    ├─ won:  run compute, cache success, release, return
//!     │    └─ lost: poll for the winner's result (200ms x 10)
//!     │         ├─ result appeared    -> replay it
//!     │         └─ bound exceeded     -> warn + execute directly
//!     └─ failures propagate, release the reservation, cache nothing
//! ```
//!
//! The bounded wait-then-recompute fallback trades strict at-most-once
//! for liveness when the original holder crashed before storing a
//! result; it is logged as an anomaly.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::core::{AppResult, Config};
use crate::kv::KvStore;

const KEY_PREFIX: &str = "idem:";

/// Deduplicator for logical write operations.
pub struct IdempotencyCoordinator {
    kv: Arc<dyn KvStore>,
    reserve_ttl: Duration,
    result_ttl: Duration,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl IdempotencyCoordinator {
    pub fn new(kv: Arc<dyn KvStore>, config: &Config) -> Self {
        Self {
            kv,
            reserve_ttl: config.idem_reserve_ttl,
            result_ttl: config.idem_result_ttl,
            poll_interval: config.idem_poll_interval,
            poll_attempts: config.idem_poll_attempts,
        }
    }

    /// Run `compute` at most once for `key`, replaying the stored result
    /// to retried or concurrent callers. Returns the result and whether
    /// it was a replay.
    ///
    /// Only successful computations are cached: a failure propagates to
    /// the caller, releases the reservation, and leaves the key free for
    /// a retry.
    pub async fn execute<T, F, Fut>(&self, key: &str, compute: F) -> AppResult<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        // The raw key is caller input; hash it to bound length and keep
        // it out of storage keys.
        let cache_key = storage_key(key);
        let reserve_key = format!("{cache_key}:lock");

        // A completed execution replays without touching the reservation.
        if let Some(cached) = self.kv.get(&cache_key).await? {
            return Ok((serde_json::from_str(&cached)?, true));
        }

        if self.kv.set_nx(&reserve_key, "1", self.reserve_ttl).await? {
            let result = match compute().await {
                Ok(value) => value,
                Err(err) => {
                    self.release(&reserve_key).await;
                    return Err(err);
                }
            };
            let encoded = serde_json::to_string(&result)?;
            self.kv.set(&cache_key, &encoded, self.result_ttl).await?;
            self.release(&reserve_key).await;
            return Ok((result, false));
        }

        // Another caller holds the reservation; wait for its result.
        for _ in 0..self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            if let Some(cached) = self.kv.get(&cache_key).await? {
                return Ok((serde_json::from_str(&cached)?, true));
            }
        }

        // The holder likely crashed before storing a result. Degrade to
        // direct execution rather than waiting forever.
        tracing::warn!(key = %cache_key, "idempotency wait exhausted, executing directly");
        let result = compute().await?;
        let encoded = serde_json::to_string(&result)?;
        self.kv.set(&cache_key, &encoded, self.result_ttl).await?;
        Ok((result, false))
    }

    /// Best-effort reservation release; the TTL is the backstop if this
    /// fails.
    async fn release(&self, reserve_key: &str) {
        if let Err(err) = self.kv.delete(reserve_key).await {
            tracing::error!(key = %reserve_key, error = %err, "failed to release idempotency reservation");
        }
    }
}

fn storage_key(key: &str) -> String {
    format!("{KEY_PREFIX}{}", hex::encode(Sha256::digest(key.as_bytes())))
}
