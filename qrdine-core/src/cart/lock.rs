//! Per-cart advisory lock
//!
//! Serializes concurrent edits to one cart so two devices adding items
//! at the same time cannot lose each other's writes. Acquisition
//! retries instead of queueing; the short TTL bounds the blast radius
//! of a crashed holder. If the acquire bound is exceeded (it sits just
//! past the TTL, so a crashed holder's key has expired by then) the
//! edit proceeds anyway — the lock is advisory and cart edits must stay
//! available.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::{AppResult, Config};
use crate::kv::KvStore;

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

pub struct CartLock {
    kv: Arc<dyn KvStore>,
    ttl: Duration,
    acquire_timeout: Duration,
}

impl CartLock {
    pub fn new(kv: Arc<dyn KvStore>, config: &Config) -> Self {
        Self {
            kv,
            ttl: config.cart_lock_ttl,
            acquire_timeout: config.cart_lock_acquire_timeout,
        }
    }

    fn key(cart_id: &str) -> String {
        format!("lock:cart:{cart_id}")
    }

    /// Run `critical` while holding the cart's lock. The lock is
    /// released on every exit path, success or failure; a lock we never
    /// actually acquired is left to its TTL. The lock value is a
    /// per-acquisition token and release checks it first: if the TTL
    /// lapsed mid-section and another holder took over, their lock is
    /// left alone.
    pub async fn with_lock<T, F, Fut>(&self, cart_id: &str, critical: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let key = Self::key(cart_id);
        let token = Uuid::new_v4().to_string();
        let deadline = Instant::now() + self.acquire_timeout;

        let mut acquired = false;
        loop {
            if self.kv.set_nx(&key, &token, self.ttl).await? {
                acquired = true;
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(cart_id, "cart lock acquisition timed out, proceeding without it");
                break;
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }

        let result = critical().await;

        if acquired {
            self.release(&key, &token, cart_id).await;
        }
        result
    }

    /// Delete the lock only while it still carries our token. The
    /// check-then-delete pair is not atomic; the window is a TTL expiry
    /// racing this call and costs at worst one early release.
    async fn release(&self, key: &str, token: &str, cart_id: &str) {
        match self.kv.get(key).await {
            Ok(Some(value)) if value == token => {
                if let Err(err) = self.kv.delete(key).await {
                    tracing::error!(cart_id, error = %err, "failed to release cart lock");
                }
            }
            Ok(_) => {
                tracing::warn!(cart_id, "cart lock expired mid-section, left to its new holder");
            }
            Err(err) => {
                tracing::error!(cart_id, error = %err, "failed to read cart lock for release");
            }
        }
    }
}
