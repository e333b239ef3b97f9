//! Engine configuration
//!
//! All knobs can be overridden through environment variables:
//!
//! | Environment variable | Default | Meaning |
//! |----------------------|---------|---------|
//! | TABLE_TOKEN_KEY | generated | current HMAC key for table tokens |
//! | TABLE_TOKEN_KEY_PRIOR | unset | prior key accepted during rotation |
//! | SESSION_CAP_SECRET | generated | HMAC key for session capabilities |
//! | SESSION_CAP_TTL_SECS | 600 | capability lifetime |
//! | TAX_RATE | 0.10 | decimal tax rate |
//! | TAX_INCLUSIVE | false | prices include tax |
//! | CART_LOCK_TTL_MS | 5000 | cart lock expiry |
//! | CART_LOCK_ACQUIRE_TIMEOUT_MS | 6000 | bound on lock acquisition |
//! | IDEM_RESERVE_TTL_SECS | 15 | idempotency reservation expiry |
//! | IDEM_RESULT_TTL_SECS | 3600 | cached result expiry |
//! | IDEM_POLL_INTERVAL_MS | 200 | replay poll interval |
//! | IDEM_POLL_ATTEMPTS | 10 | replay poll attempts |
//! | EVENT_CHANNEL_CAPACITY | 1024 | fanout broadcast buffer |

use ring::rand::{SecureRandom, SystemRandom};
use rust_decimal::Decimal;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Current HMAC signing key for table identity tokens
    pub table_key_current: String,
    /// Prior table key, still accepted so printed QR codes survive rotation
    pub table_key_prior: Option<String>,
    /// HMAC signing key for session capabilities (no rotation fallback,
    /// capabilities are short-lived by design)
    pub session_secret: String,
    /// Session capability lifetime in seconds
    pub session_ttl_secs: i64,
    /// Tax rate applied at submission
    pub tax_rate: Decimal,
    /// Whether catalog prices already include tax
    pub tax_inclusive: bool,
    /// Cart lock expiry (backstop against crashed holders)
    pub cart_lock_ttl: Duration,
    /// How long a contended cart edit retries before proceeding
    pub cart_lock_acquire_timeout: Duration,
    /// Idempotency reservation expiry
    pub idem_reserve_ttl: Duration,
    /// Cached idempotency result expiry
    pub idem_result_ttl: Duration,
    /// Interval between replay polls while another caller computes
    pub idem_poll_interval: Duration,
    /// Number of replay polls before degrading to direct execution
    pub idem_poll_attempts: u32,
    /// Per-channel fanout broadcast buffer size
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            table_key_current: env_secret("TABLE_TOKEN_KEY"),
            table_key_prior: std::env::var("TABLE_TOKEN_KEY_PRIOR").ok(),
            session_secret: env_secret("SESSION_CAP_SECRET"),
            session_ttl_secs: env_parse("SESSION_CAP_TTL_SECS", 600),
            tax_rate: std::env::var("TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_tax_rate),
            tax_inclusive: env_parse("TAX_INCLUSIVE", false),
            cart_lock_ttl: Duration::from_millis(env_parse("CART_LOCK_TTL_MS", 5000)),
            cart_lock_acquire_timeout: Duration::from_millis(env_parse(
                "CART_LOCK_ACQUIRE_TIMEOUT_MS",
                6000,
            )),
            idem_reserve_ttl: Duration::from_secs(env_parse("IDEM_RESERVE_TTL_SECS", 15)),
            idem_result_ttl: Duration::from_secs(env_parse("IDEM_RESULT_TTL_SECS", 3600)),
            idem_poll_interval: Duration::from_millis(env_parse("IDEM_POLL_INTERVAL_MS", 200)),
            idem_poll_attempts: env_parse("IDEM_POLL_ATTEMPTS", 10),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", 1024),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_key_current: generate_secret(),
            table_key_prior: None,
            session_secret: generate_secret(),
            session_ttl_secs: 600,
            tax_rate: default_tax_rate(),
            tax_inclusive: false,
            cart_lock_ttl: Duration::from_millis(5000),
            cart_lock_acquire_timeout: Duration::from_millis(6000),
            idem_reserve_ttl: Duration::from_secs(15),
            idem_result_ttl: Duration::from_secs(3600),
            idem_poll_interval: Duration::from_millis(200),
            idem_poll_attempts: 10,
            event_channel_capacity: 1024,
        }
    }
}

fn default_tax_rate() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read a signing secret from the environment, generating an ephemeral
/// one when unset. Generated secrets do not survive restarts, so tokens
/// signed with them are invalidated on reboot.
fn env_secret(name: &str) -> String {
    match std::env::var(name) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(var = name, "signing key not set, generated an ephemeral one");
            generate_secret()
        }
    }
}

fn generate_secret() -> String {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    // SystemRandom failure means the OS RNG is unusable; nothing
    // sensible to do but abort startup.
    rng.fill(&mut bytes)
        .expect("system random generator unavailable");
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.session_ttl_secs, 600);
        assert_eq!(config.tax_rate, Decimal::new(10, 2));
        assert!(!config.tax_inclusive);
        assert_eq!(config.idem_poll_attempts, 10);
        assert_eq!(config.table_key_current.len(), 64);
        assert_ne!(config.table_key_current, config.session_secret);
    }
}
