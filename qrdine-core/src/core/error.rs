//! Unified error handling
//!
//! Application error enum with stable error codes, mapped so transport
//! adapters can translate to status codes without inspecting messages.
//!
//! # Error code table
//!
//! | Code | Variant | Category |
//! |-------|------------------|-------------------------------|
//! | E1001 | Unauthorized | authentication failure |
//! | E1002 | TokenExpired | authentication failure |
//! | E2001 | TableMismatch | authorization mismatch |
//! | E2002 | Forbidden | authorization failure |
//! | E0002 | Validation | rejected input, no state touched |
//! | E0003 | NotFound | unknown referenced entity |
//! | E0004 | Conflict | concurrent write lost the race |
//! | E9001 | Internal | infrastructure failure |
//! | E9002 | Storage | infrastructure failure |

use serde::Serialize;
use tracing::error;

use crate::db::StoreError;

/// Application error enum.
///
/// Authentication and authorization mismatches are deliberately distinct
/// variants: a syntactically valid capability presented against the
/// wrong table is `TableMismatch`, never `Unauthorized`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors ==========
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Session capability expired")]
    TokenExpired,

    // ========== Authorization errors ==========
    #[error("Session capability does not match this table")]
    TableMismatch,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business logic errors ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ========== System errors ==========
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias used throughout the engine.
pub type AppResult<T> = Result<T, AppError>;

/// Client-visible error body. Internal detail never leaks through it.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    /// Stable code for the error, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "E1001",
            AppError::TokenExpired => "E1002",
            AppError::TableMismatch => "E2001",
            AppError::Forbidden(_) => "E2002",
            AppError::Validation(_) => "E0002",
            AppError::NotFound(_) => "E0003",
            AppError::Conflict(_) => "E0004",
            AppError::Internal(_) => "E9001",
            AppError::Storage(_) => "E9002",
        }
    }

    /// Short human-readable reason, safe to surface to clients.
    /// Infrastructure failures are logged here with full detail and
    /// reported with a generic message.
    pub fn client_body(&self) -> ErrorBody {
        let message = match self {
            AppError::Storage(detail) => {
                error!(target: "storage", error = %detail, "Storage error occurred");
                "A storage error occurred".to_string()
            }
            AppError::Internal(err) => {
                error!(target: "internal", error = ?err, "Internal error occurred");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody {
            code: self.code(),
            message,
        }
    }

    // ========== Helper constructors ==========

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_mismatch_codes_are_distinct() {
        assert_eq!(AppError::unauthorized("bad token").code(), "E1001");
        assert_eq!(AppError::TokenExpired.code(), "E1002");
        assert_eq!(AppError::TableMismatch.code(), "E2001");
        assert_ne!(
            AppError::TableMismatch.code(),
            AppError::unauthorized("x").code()
        );
    }

    #[test]
    fn internal_detail_does_not_leak() {
        let err = AppError::storage("connection reset by peer at 10.0.0.3");
        let body = err.client_body();
        assert_eq!(body.code, "E9002");
        assert!(!body.message.contains("10.0.0.3"));
    }
}
