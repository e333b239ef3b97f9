//! Concurrency stress on the idempotency coordinator: many racing
//! callers with one key must produce exactly one execution.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use qrdine_core::cart::{AddCartItemInput, add_cart_item, get_cart};

#[tokio::test]
async fn racing_callers_with_one_key_execute_once() {
    let state = common::core_state().await;
    let executions = Arc::new(AtomicUsize::new(0));

    let handles = (0..8).map(|_| {
        let state = state.clone();
        let executions = executions.clone();
        tokio::spawn(async move {
            state
                .idempotency
                .execute("race-key", || async {
                    executions.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, qrdine_core::AppError>(99)
                })
                .await
                .unwrap()
        })
    });

    let mut fresh = 0;
    for outcome in join_all(handles).await {
        let (value, replayed) = outcome.unwrap();
        assert_eq!(value, 99);
        if !replayed {
            fresh += 1;
        }
    }

    assert_eq!(executions.load(Ordering::SeqCst), 1);
    assert_eq!(fresh, 1, "exactly one caller computes, the rest replay");
}

#[tokio::test]
async fn racing_cart_adds_with_one_key_insert_one_line() {
    let state = common::core_state().await;
    let auth = common::table_auth(&state, "sess-a").await;

    let handles = (0..4).map(|_| {
        let state = state.clone();
        let auth = auth.clone();
        tokio::spawn(async move {
            add_cart_item(
                &state,
                &auth,
                "dev-1",
                "shared-key",
                AddCartItemInput {
                    item_id: "fries".to_string(),
                    quantity: Some(1),
                    options: Vec::new(),
                    notes: None,
                },
            )
            .await
            .unwrap()
        })
    });
    for outcome in join_all(handles).await {
        outcome.unwrap();
    }

    let cart = get_cart(&state, &auth).await.unwrap();
    assert_eq!(cart.items.len(), 1);
}
