//! Cart operations for table devices
//!
//! # Mutation flow
//!
//! ```text
//! add_cart_item(state, auth, device, idem_key, input)
//!     ├─ 1. Structural validation (before any reservation)
//!     ├─ 2. IdempotencyCoordinator::execute
//!     │      ├─ 3. resolve-or-create the table's open cart
//!     │      ├─ 4. CartLock::with_lock
//!     │      │      ├─ 5. catalog item exists, active, not 86'd
//!     │      │      ├─ 6. insert line
//!     │      │      └─ 7. read full post-write snapshot
//!     │      └─ 8. publish cart_updated
//!     └─ returns (CartPayload, was_replayed)
//! ```
//!
//! Callers always get the full current cart back, never a delta, so a
//! device's view is consistent with what it just wrote.

mod lock;

pub use lock::CartLock;

use chrono::Utc;
use serde_json::json;
use shared::EventName;
use shared::models::{Cart, CartItem, CartItemState};
use shared::types::OptionSelections;
use shared::wire::{CartItemPayload, CartPayload};
use uuid::Uuid;
use validator::Validate;

use crate::auth::TableAuth;
use crate::core::{AppError, AppResult, CoreState};
use crate::db::StoreError;
use crate::utils::validation::{
    clamp_quantity, sanitize_note, validate_device_id, validate_options,
};

/// Add-item request body.
#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct AddCartItemInput {
    #[validate(length(min = 1, max = 64))]
    pub item_id: String,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub options: OptionSelections,
    pub notes: Option<String>,
}

/// Look up the table's open cart, creating it on first access. Safe
/// under concurrent first contact: losing the storage uniqueness race
/// falls back to fetching the winner's cart.
pub async fn resolve_cart(state: &CoreState, table_id: i64) -> AppResult<Cart> {
    if let Some(cart) = state.store.open_cart(table_id).await? {
        return Ok(cart);
    }
    let cart = Cart::new(table_id);
    match state.store.insert_cart(&cart).await {
        Ok(()) => Ok(cart),
        Err(StoreError::Conflict(_)) => state
            .store
            .open_cart(table_id)
            .await?
            .ok_or_else(|| AppError::storage("open cart missing after insert conflict")),
        Err(err) => Err(err.into()),
    }
}

/// Build the full client-visible snapshot of a cart, catalog titles
/// joined in (a deleted catalog row falls back to the item id).
pub async fn cart_payload(state: &CoreState, cart: &Cart) -> AppResult<CartPayload> {
    let items = state.store.cart_items(&cart.id).await?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let title = state
            .store
            .menu_item(&item.item_id)
            .await?
            .map(|m| m.title)
            .unwrap_or_else(|| item.item_id.clone());
        out.push(CartItemPayload {
            id: item.id,
            item_id: item.item_id,
            title,
            quantity: item.quantity,
            options: item.options,
            notes: item.notes,
            added_by: item.added_by,
            state: item.state,
        });
    }
    Ok(CartPayload {
        cart_id: cart.id.clone(),
        items: out,
    })
}

/// Current cart for the authorized table (created lazily).
pub async fn get_cart(state: &CoreState, auth: &TableAuth) -> AppResult<CartPayload> {
    let cart = resolve_cart(state, auth.table.id).await?;
    cart_payload(state, &cart).await
}

/// Add one line to the table's cart. Deduplicated by the caller's
/// idempotency key scoped to the device session; retries replay the
/// first execution's snapshot.
pub async fn add_cart_item(
    state: &CoreState,
    auth: &TableAuth,
    device_id: &str,
    idem_key: &str,
    input: AddCartItemInput,
) -> AppResult<(CartPayload, bool)> {
    // Reject bad input before consuming a lock or reservation.
    validate_device_id(device_id)?;
    input
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    validate_options(&input.options)?;
    let quantity = clamp_quantity(input.quantity)?;
    let notes = sanitize_note(input.notes.as_deref());

    let table_id = auth.table.id;
    // Operation-prefixed so an add key can never alias a submit key.
    let dedup_key = format!("add:{idem_key}:{}", auth.capability.session_id);

    state
        .idempotency
        .execute(&dedup_key, || async {
            let cart = resolve_cart(state, table_id).await?;
            let payload = state
                .cart_lock
                .with_lock(&cart.id, || async {
                    let item = state
                        .store
                        .menu_item(&input.item_id)
                        .await?
                        .filter(|m| m.is_active && !m.is_86)
                        .ok_or_else(|| AppError::validation("item unavailable"))?;

                    let now = Utc::now();
                    let line = CartItem {
                        id: Uuid::new_v4().to_string(),
                        cart_id: cart.id.clone(),
                        item_id: item.id,
                        quantity,
                        options: input.options.clone(),
                        notes: notes.clone(),
                        added_by: device_id.to_string(),
                        state: CartItemState::InCart,
                        created_at: now,
                        updated_at: now,
                    };
                    state.store.insert_cart_item(&line).await?;

                    // Snapshot while still holding the lock so the
                    // response reflects exactly the post-write state.
                    cart_payload(state, &cart).await
                })
                .await?;

            state
                .bus
                .publish(table_id, EventName::CartUpdated, json!({ "cart_id": cart.id }));
            Ok(payload)
        })
        .await
}
