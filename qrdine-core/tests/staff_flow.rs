//! Staff-side order lifecycle: transitions through the closed state
//! graph, voiding with a reason, and the listing view.

mod common;

use qrdine_core::AppError;
use qrdine_core::cart::{AddCartItemInput, add_cart_item};
use qrdine_core::orders::{list_orders, submit_cart, transition_order};
use shared::models::{Actor, OrderState};

async fn placed_order(state: &qrdine_core::CoreState, session: &str, idem: &str) -> String {
    let auth = common::table_auth(state, session).await;
    add_cart_item(
        state,
        &auth,
        "dev-1",
        &format!("{idem}-add"),
        AddCartItemInput {
            item_id: "burger".to_string(),
            quantity: Some(1),
            options: Vec::new(),
            notes: None,
        },
    )
    .await
    .unwrap();
    let (receipt, _) = submit_cart(state, &auth, "dev-1", idem).await.unwrap();
    receipt.order_id
}

#[tokio::test]
async fn happy_path_walks_the_graph_in_order() {
    let state = common::core_state().await;
    let order_id = placed_order(&state, "sess-a", "s1").await;

    for target in [OrderState::Accepted, OrderState::Ready, OrderState::Served] {
        let receipt = transition_order(&state, &order_id, target, "staff-1", None)
            .await
            .unwrap();
        assert_eq!(receipt.state, target);
    }

    let events = state.store.order_events(&order_id).await.unwrap();
    let actions: Vec<_> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["submitted", "accepted", "ready", "served"]);
    assert!(events[1..]
        .iter()
        .all(|e| matches!(e.actor, Actor::Staff { ref user_id } if user_id == "staff-1")));
}

#[tokio::test]
async fn illegal_jumps_are_rejected() {
    let state = common::core_state().await;
    let order_id = placed_order(&state, "sess-a", "s1").await;

    // Skipping Accepted entirely.
    let err = transition_order(&state, &order_id, OrderState::Served, "staff-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // No audit event for the rejected attempt.
    assert_eq!(state.store.order_events(&order_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn terminal_orders_are_frozen() {
    let state = common::core_state().await;
    let order_id = placed_order(&state, "sess-a", "s1").await;

    transition_order(&state, &order_id, OrderState::Voided, "staff-1", Some("spill"))
        .await
        .unwrap();
    let err = transition_order(&state, &order_id, OrderState::Accepted, "staff-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn void_reason_is_sanitized_and_capped() {
    let state = common::core_state().await;
    let order_id = placed_order(&state, "sess-a", "s1").await;

    let long_reason = format!("<b>guest left</b> {}", "x".repeat(400));
    transition_order(
        &state,
        &order_id,
        OrderState::Voided,
        "staff-1",
        Some(&long_reason),
    )
    .await
    .unwrap();

    let events = state.store.order_events(&order_id).await.unwrap();
    let reason = events.last().unwrap().reason.as_deref().unwrap();
    assert!(reason.starts_with("guest left"));
    assert!(!reason.contains('<'));
    assert!(reason.chars().count() <= 255);
}

#[tokio::test]
async fn staff_identity_is_required() {
    let state = common::core_state().await;
    let order_id = placed_order(&state, "sess-a", "s1").await;

    let err = transition_order(&state, &order_id, OrderState::Accepted, "  ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let state = common::core_state().await;
    let err = transition_order(&state, "no-such-order", OrderState::Accepted, "staff-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn listing_filters_by_state_newest_first() {
    let state = common::core_state().await;
    let first = placed_order(&state, "sess-a", "s1").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = placed_order(&state, "sess-a", "s2").await;
    transition_order(&state, &first, OrderState::Accepted, "staff-1", None)
        .await
        .unwrap();

    let all = list_orders(&state, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second, "newest order listed first");

    let submitted = list_orders(&state, Some(OrderState::Submitted)).await.unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].id, second);

    let accepted = list_orders(&state, Some(OrderState::Accepted)).await.unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id, first);
}
