//! Order submission and lifecycle
//!
//! Submission is the one-way promotion of a cart's `InCart` lines into
//! an immutable order: titles and prices are snapshotted from the live
//! catalog at that instant, totals are computed exactly once, and the
//! consumed cart lines flip to `Submitted` in the same atomic write as
//! the order rows and the first audit event. Staff then drive the order
//! through the closed state graph; every transition appends an audit
//! event atomically with the state change, and the fanout fires only
//! after the commit.

use chrono::Utc;
use serde_json::json;
use shared::EventName;
use shared::models::{Actor, CartItemState, Order, OrderEvent, OrderItem, OrderState};
use shared::wire::{OrderRow, SubmitReceipt};
use uuid::Uuid;

use crate::auth::TableAuth;
use crate::cart::resolve_cart;
use crate::core::{AppError, AppResult, CoreState};
use crate::pricing::{LineItem, TaxMode, compute_totals};
use crate::utils::validation::{sanitize_reason, validate_device_id};

/// Promote the table's cart into an order. Deduplicated by the caller's
/// idempotency key scoped to the device session; the sole creation path
/// for orders.
pub async fn submit_cart(
    state: &CoreState,
    auth: &TableAuth,
    device_id: &str,
    idem_key: &str,
) -> AppResult<(SubmitReceipt, bool)> {
    validate_device_id(device_id)?;

    let table_id = auth.table.id;
    let dedup_key = format!("submit:{idem_key}:{}", auth.capability.session_id);

    state
        .idempotency
        .execute(&dedup_key, || async {
            let cart = resolve_cart(state, table_id).await?;
            // Submission mutates cart-item state, so it runs under the
            // same lock as other cart edits.
            let receipt = state
                .cart_lock
                .with_lock(&cart.id, || async {
                    let lines: Vec<_> = state
                        .store
                        .cart_items(&cart.id)
                        .await?
                        .into_iter()
                        .filter(|item| item.state == CartItemState::InCart)
                        .collect();
                    if lines.is_empty() {
                        return Err(AppError::validation("cart is empty"));
                    }

                    let order_id = Uuid::new_v4().to_string();
                    let now = Utc::now();
                    let mut priced = Vec::with_capacity(lines.len());
                    let mut snapshots = Vec::with_capacity(lines.len());
                    for line in &lines {
                        // Snapshot price and title now; later catalog
                        // edits must not touch the placed order.
                        let item = state
                            .store
                            .menu_item(&line.item_id)
                            .await?
                            .filter(|m| m.is_active && !m.is_86)
                            .ok_or_else(|| {
                                AppError::validation(format!(
                                    "item {} is no longer available",
                                    line.item_id
                                ))
                            })?;
                        priced.push(LineItem {
                            quantity: line.quantity,
                            unit_price: item.price,
                        });
                        snapshots.push(OrderItem {
                            id: Uuid::new_v4().to_string(),
                            order_id: order_id.clone(),
                            item_id: line.item_id.clone(),
                            title_snapshot: item.title,
                            quantity: line.quantity,
                            price_each: item.price,
                            options: line.options.clone(),
                            notes: line.notes.clone(),
                            created_at: now,
                        });
                    }

                    let mode = if state.config.tax_inclusive {
                        TaxMode::Inclusive
                    } else {
                        TaxMode::Exclusive
                    };
                    let totals = compute_totals(&priced, mode, state.config.tax_rate);

                    let order = Order {
                        id: order_id.clone(),
                        table_id,
                        state: OrderState::Submitted,
                        subtotal: totals.subtotal,
                        tax: totals.tax,
                        total: totals.total,
                        created_at: now,
                        updated_at: now,
                    };
                    let event = OrderEvent {
                        id: 0, // assigned by the store
                        order_id: order_id.clone(),
                        order_item_id: None,
                        actor: Actor::TableDevice {
                            device_id: device_id.to_string(),
                        },
                        action: OrderState::Submitted.as_str().to_string(),
                        reason: None,
                        created_at: now,
                    };
                    let consumed: Vec<String> =
                        lines.iter().map(|line| line.id.clone()).collect();

                    state
                        .store
                        .create_order(&order, &snapshots, &event, &consumed)
                        .await?;

                    Ok(SubmitReceipt {
                        order_id,
                        state: OrderState::Submitted,
                    })
                })
                .await?;

            state.bus.publish(
                table_id,
                EventName::OrderSubmitted,
                json!({ "order_id": receipt.order_id, "state": receipt.state }),
            );
            Ok(receipt)
        })
        .await
}

/// Staff action: move an order to a new state.
///
/// The target must be reachable from the current state per the closed
/// transition graph; illegal jumps are validation failures, and a race
/// with another staff device surfaces as a conflict from the store's
/// atomic re-check.
pub async fn transition_order(
    state: &CoreState,
    order_id: &str,
    target: OrderState,
    staff_user_id: &str,
    reason: Option<&str>,
) -> AppResult<SubmitReceipt> {
    if staff_user_id.trim().is_empty() {
        return Err(AppError::forbidden("staff identity required"));
    }

    let order = state
        .store
        .order(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("order {order_id}")))?;
    if !order.state.can_transition_to(target) {
        return Err(AppError::validation(format!(
            "illegal transition {} -> {}",
            order.state, target
        )));
    }

    let event = OrderEvent {
        id: 0, // assigned by the store
        order_id: order_id.to_string(),
        order_item_id: None,
        actor: Actor::Staff {
            user_id: staff_user_id.to_string(),
        },
        action: target.as_str().to_string(),
        reason: sanitize_reason(reason),
        created_at: Utc::now(),
    };
    let updated = state.store.update_order_state(order_id, target, &event).await?;

    state.bus.publish(
        updated.table_id,
        EventName::OrderStateChanged,
        json!({ "order_id": updated.id, "state": updated.state }),
    );
    Ok(SubmitReceipt {
        order_id: updated.id,
        state: updated.state,
    })
}

/// Staff listing: orders newest first, optionally filtered by state.
pub async fn list_orders(
    state: &CoreState,
    filter: Option<OrderState>,
) -> AppResult<Vec<OrderRow>> {
    let orders = state.store.orders_by_state(filter).await?;
    Ok(orders
        .into_iter()
        .map(|order| OrderRow {
            id: order.id,
            table_id: order.table_id,
            state: order.state,
            subtotal: order.subtotal,
            tax: order.tax,
            total: order.total,
            created_at: order.created_at,
        })
        .collect())
}
