//! Cart and cart item models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::OptionSelections;

/// The mutable pre-order basket for one table.
///
/// At most one open cart per table at a time; created lazily on first
/// access and never deleted — it is superseded implicitly once all of
/// its items have been promoted into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub table_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(table_id: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            table_id,
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle of a cart line. `InCart -> Submitted` is one-way and
/// happens only as part of an order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartItemState {
    InCart,
    Submitted,
}

impl fmt::Display for CartItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartItemState::InCart => write!(f, "in_cart"),
            CartItemState::Submitted => write!(f, "submitted"),
        }
    }
}

/// One line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub item_id: String,
    pub quantity: i32,
    pub options: OptionSelections,
    pub notes: Option<String>,
    /// Anonymous device identifier of whoever added the line
    pub added_by: String,
    pub state: CartItemState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
