//! Table identity tokens and session capabilities
//!
//! Both token kinds share one wire form:
//! `base64url(json_body) . base64url(hmac_sha256(key, json_body))`.
//!
//! Table tokens carry the table's opaque public identifier and are
//! verified against the current signing key with a single prior-key
//! fallback for rotation (printed QR codes live a long time). Session
//! capabilities bind one device session to one table for a few minutes;
//! they get no rotation fallback and their expiry is checked on every
//! use.
//!
//! Pure validation throughout, no side effects.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, AppResult, Config};

/// Opaque table identifier allow-list: alphanumeric, `-`, `_`, 8-64 chars.
const OPAQUE_UID_MIN_LEN: usize = 8;
const OPAQUE_UID_MAX_LEN: usize = 64;

/// Verified session capability claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCapability {
    pub table_id: i64,
    pub session_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Signed body of a table identity token.
#[derive(Debug, Serialize, Deserialize)]
struct TableClaims {
    tab: String,
    iat: i64,
}

/// Signed body of a session capability.
#[derive(Debug, Serialize, Deserialize)]
struct CapabilityClaims {
    tid: i64,
    sid: String,
    iat: i64,
    exp: i64,
}

/// Signing keys and capability lifetime.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub table_key_current: String,
    pub table_key_prior: Option<String>,
    pub session_secret: String,
    pub session_ttl_secs: i64,
}

impl TokenConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            table_key_current: config.table_key_current.clone(),
            table_key_prior: config.table_key_prior.clone(),
            session_secret: config.session_secret.clone(),
            session_ttl_secs: config.session_ttl_secs,
        }
    }
}

/// Token issuing and verification service.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self::with_token_config(TokenConfig::from_config(config))
    }

    pub fn with_token_config(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Sign a table identity token with the current key.
    pub fn issue_table_token(&self, opaque_uid: &str) -> AppResult<String> {
        let claims = TableClaims {
            tab: opaque_uid.to_string(),
            iat: Utc::now().timestamp(),
        };
        let body = serde_json::to_vec(&claims)?;
        Ok(sign(&body, &self.config.table_key_current))
    }

    /// Resolve a table's opaque identifier from any of the three accepted
    /// forms, tried in order:
    ///
    /// 1. a signed table token (current key, then prior key);
    /// 2. a bootstrap JSON object `{"tab": "<uid>"}`;
    /// 3. the raw opaque identifier itself.
    ///
    /// Forms 2 and 3 exist for first-contact devices that have not yet
    /// received a signed token; both are held to the strict allow-list
    /// pattern.
    pub fn extract_table_uid(&self, input: &str) -> AppResult<String> {
        if input.is_empty() {
            return Err(AppError::unauthorized("missing table token"));
        }

        let mut keys = vec![self.config.table_key_current.as_str()];
        if let Some(prior) = &self.config.table_key_prior {
            keys.push(prior.as_str());
        }
        if let Some(body) = verify(input, &keys)
            && let Ok(claims) = serde_json::from_slice::<TableClaims>(&body)
        {
            return Ok(claims.tab);
        }

        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(input)
            && let Some(serde_json::Value::String(tab)) = map.get("tab")
            && is_valid_opaque_uid(tab)
        {
            return Ok(tab.clone());
        }

        if is_valid_opaque_uid(input) {
            return Ok(input.to_string());
        }

        Err(AppError::unauthorized("unrecognized table token"))
    }

    /// Sign a session capability for one device session at one table.
    pub fn issue_session_capability(
        &self,
        table_id: i64,
        session_id: &str,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = CapabilityClaims {
            tid: table_id,
            sid: session_id.to_string(),
            iat: now,
            exp: now + self.config.session_ttl_secs,
        };
        let body = serde_json::to_vec(&claims)?;
        Ok(sign(&body, &self.config.session_secret))
    }

    /// Verify a session capability: HMAC against the session secret only,
    /// then `now < exp`. An expired capability is rejected regardless of
    /// signature validity.
    pub fn verify_session_capability(&self, token: &str) -> AppResult<SessionCapability> {
        let body = verify(token, &[self.config.session_secret.as_str()])
            .ok_or_else(|| AppError::unauthorized("invalid session capability"))?;
        let claims: CapabilityClaims = serde_json::from_slice(&body)
            .map_err(|_| AppError::unauthorized("malformed session capability"))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::TokenExpired);
        }
        Ok(SessionCapability {
            table_id: claims.tid,
            session_id: claims.sid,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

/// Check an opaque table identifier against the allow-list pattern
/// `^[A-Za-z0-9_-]{8,64}$`.
pub fn is_valid_opaque_uid(uid: &str) -> bool {
    (OPAQUE_UID_MIN_LEN..=OPAQUE_UID_MAX_LEN).contains(&uid.len())
        && uid
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn sign(body: &[u8], key: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    let tag = hmac::sign(&key, body);
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(body),
        URL_SAFE_NO_PAD.encode(tag.as_ref())
    )
}

/// Verify a two-part token against each key in turn, returning the
/// decoded body on the first match. `ring::hmac::verify` is
/// constant-time.
fn verify(token: &str, keys: &[&str]) -> Option<Vec<u8>> {
    let (body_b64, sig_b64) = token.split_once('.')?;
    let body = URL_SAFE_NO_PAD.decode(body_b64).ok()?;
    let sig = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;
    for key in keys {
        let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
        if hmac::verify(&key, &body, &sig).is_ok() {
            return Some(body);
        }
    }
    None
}
