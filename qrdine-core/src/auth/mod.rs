//! Caller identity and authorization
//!
//! Table devices authenticate with two credentials: a table identity
//! token (who the table is) and a session capability (proof this device
//! session was admitted to that table). Every mutating operation
//! additionally checks that the two resolve to the same table — a
//! mismatch is an authorization failure, kept distinct from an invalid
//! token.

mod tokens;

pub use tokens::{SessionCapability, TokenConfig, TokenService, is_valid_opaque_uid};

use shared::models::Table;

use crate::core::{AppError, AppResult, CoreState};

/// Verified caller identity for table-device operations.
#[derive(Debug, Clone)]
pub struct TableAuth {
    pub table: Table,
    pub capability: SessionCapability,
}

/// Authorize a table-device request.
///
/// Resolves the table from the table token, verifies the session
/// capability (signature and expiry), and requires both to name the
/// same table. Runs before any lock or idempotency reservation is
/// taken; no state is touched on rejection.
pub async fn authorize_table(
    state: &CoreState,
    table_token: &str,
    session_cap: &str,
) -> AppResult<TableAuth> {
    let opaque_uid = state.tokens.extract_table_uid(table_token)?;
    let capability = state.tokens.verify_session_capability(session_cap)?;

    let table = state
        .store
        .table_by_opaque_uid(&opaque_uid)
        .await?
        .ok_or_else(|| AppError::not_found("table"))?;
    if !table.is_active {
        return Err(AppError::not_found("table"));
    }
    if table.id != capability.table_id {
        return Err(AppError::TableMismatch);
    }

    Ok(TableAuth { table, capability })
}
