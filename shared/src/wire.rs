//! Wire payload shapes
//!
//! Response bodies returned by the engine's operations and carried in
//! fanout envelopes. Transport adapters relay these verbatim.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CartItemState, OrderState};
use crate::types::OptionSelections;

/// Full post-write cart snapshot returned by cart operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartPayload {
    pub cart_id: String,
    pub items: Vec<CartItemPayload>,
}

/// One cart line as seen by clients, with the catalog title joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemPayload {
    pub id: String,
    pub item_id: String,
    pub title: String,
    pub quantity: i32,
    pub options: OptionSelections,
    pub notes: Option<String>,
    pub added_by: String,
    pub state: CartItemState,
}

/// Result of a cart submission or a staff transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub order_id: String,
    pub state: OrderState,
}

/// One order in the staff listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub table_id: i64,
    pub state: OrderState,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}
