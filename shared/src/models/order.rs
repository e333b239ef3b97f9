//! Order, order item and order event models
//!
//! An order is the immutable-once-created counterpart of a cart: totals
//! are computed exactly once at creation, item rows are snapshots
//! decoupled from the live catalog, and every state transition appends
//! an audit event.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::OptionSelections;

/// Order lifecycle states.
///
/// Happy path is strictly linear: `Submitted -> Accepted -> Ready ->
/// Served`. `Voided` is reachable from every non-terminal state.
/// `Served` and `Voided` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Submitted,
    Accepted,
    Ready,
    Served,
    Voided,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Submitted => "submitted",
            OrderState::Accepted => "accepted",
            OrderState::Ready => "ready",
            OrderState::Served => "served",
            OrderState::Voided => "voided",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Served | OrderState::Voided)
    }

    /// Explicit transition table. No skips on the happy path; voiding is
    /// allowed from any non-terminal state.
    pub fn can_transition_to(&self, target: OrderState) -> bool {
        match (self, target) {
            (OrderState::Submitted, OrderState::Accepted) => true,
            (OrderState::Accepted, OrderState::Ready) => true,
            (OrderState::Ready, OrderState::Served) => true,
            (_, OrderState::Voided) => !self.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Financial and fulfillment record derived from a cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_id: i64,
    pub state: OrderState,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of a cart line at submission time, decoupled from
/// the live catalog so later catalog edits cannot alter a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    pub title_snapshot: String,
    pub quantity: i32,
    pub price_each: Decimal,
    pub options: OptionSelections,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Who performed an order action. Exactly one of a staff user or an
/// anonymous table device, by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Staff { user_id: String },
    TableDevice { device_id: String },
}

/// Append-only audit record of one state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Append sequence assigned by the store
    pub id: u64,
    pub order_id: String,
    pub order_item_id: Option<String>,
    pub actor: Actor,
    pub action: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_linear() {
        assert!(OrderState::Submitted.can_transition_to(OrderState::Accepted));
        assert!(OrderState::Accepted.can_transition_to(OrderState::Ready));
        assert!(OrderState::Ready.can_transition_to(OrderState::Served));
    }

    #[test]
    fn no_skips_or_reversals() {
        assert!(!OrderState::Submitted.can_transition_to(OrderState::Ready));
        assert!(!OrderState::Submitted.can_transition_to(OrderState::Served));
        assert!(!OrderState::Served.can_transition_to(OrderState::Accepted));
        assert!(!OrderState::Ready.can_transition_to(OrderState::Accepted));
        assert!(!OrderState::Accepted.can_transition_to(OrderState::Submitted));
    }

    #[test]
    fn void_reachable_from_every_non_terminal_state() {
        assert!(OrderState::Submitted.can_transition_to(OrderState::Voided));
        assert!(OrderState::Accepted.can_transition_to(OrderState::Voided));
        assert!(OrderState::Ready.can_transition_to(OrderState::Voided));
    }

    #[test]
    fn terminal_states_are_frozen() {
        for target in [
            OrderState::Submitted,
            OrderState::Accepted,
            OrderState::Ready,
            OrderState::Served,
            OrderState::Voided,
        ] {
            assert!(!OrderState::Served.can_transition_to(target));
            assert!(!OrderState::Voided.can_transition_to(target));
        }
    }

    #[test]
    fn states_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(OrderState::Submitted).unwrap(),
            "submitted"
        );
        assert_eq!(OrderState::Voided.to_string(), "voided");
    }
}
