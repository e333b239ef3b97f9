#![allow(dead_code)]

use chrono::Utc;
use qrdine_core::auth::{TableAuth, authorize_table};
use qrdine_core::{Config, CoreState};
use rust_decimal::Decimal;
use shared::models::{MenuItem, Table};

pub const TABLE_ID: i64 = 7;
pub const TABLE_UID: &str = "tbl-7-a1b2c3d4";

pub const OTHER_TABLE_ID: i64 = 8;
pub const OTHER_TABLE_UID: &str = "tbl-8-e5f6a7b8";

/// Fresh engine with two active tables and a small seeded catalog.
pub async fn core_state() -> CoreState {
    let state = CoreState::new(Config::default());
    seed_table(&state, TABLE_ID, "Table 7", TABLE_UID).await;
    seed_table(&state, OTHER_TABLE_ID, "Table 8", OTHER_TABLE_UID).await;
    seed_item(&state, "burger", "Burger", "10.00", true, false).await;
    seed_item(&state, "fries", "Fries", "5.00", true, false).await;
    seed_item(&state, "oysters", "Oysters", "14.00", true, true).await;
    seed_item(&state, "retired", "Retired Special", "9.00", false, false).await;
    state
}

pub async fn seed_table(state: &CoreState, id: i64, name: &str, opaque_uid: &str) {
    state
        .store
        .insert_table(&Table {
            id,
            name: name.to_string(),
            opaque_uid: opaque_uid.to_string(),
            is_active: true,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

pub async fn seed_item(
    state: &CoreState,
    id: &str,
    title: &str,
    price: &str,
    is_active: bool,
    is_86: bool,
) {
    state
        .store
        .insert_menu_item(&MenuItem {
            id: id.to_string(),
            title: title.to_string(),
            price: price.parse::<Decimal>().unwrap(),
            is_active,
            is_86,
        })
        .await
        .unwrap();
}

/// Authorize a device session at the seeded default table.
pub async fn table_auth(state: &CoreState, session_id: &str) -> TableAuth {
    table_auth_for(state, TABLE_UID, TABLE_ID, session_id).await
}

pub async fn table_auth_for(
    state: &CoreState,
    opaque_uid: &str,
    table_id: i64,
    session_id: &str,
) -> TableAuth {
    let token = state.tokens.issue_table_token(opaque_uid).unwrap();
    let cap = state
        .tokens
        .issue_session_capability(table_id, session_id)
        .unwrap();
    authorize_table(state, &token, &cap).await.unwrap()
}
