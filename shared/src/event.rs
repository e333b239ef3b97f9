//! Fanout event envelope and channel naming
//!
//! Every state change is published to exactly two broadcast channels:
//! the owning table's channel and the venue-wide staff channel.
//! Subscribers distinguish event kinds by the envelope's `event` name.
//! Delivery is best-effort at-most-once; a reconnecting viewer re-reads
//! current state instead of relying on catch-up delivery.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kinds carried by the fanout envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// Greeting sent by the transport when a viewer connects
    Hello,
    /// The cart's contents changed
    CartUpdated,
    /// A cart was promoted into an order
    OrderSubmitted,
    /// A staff action moved an order to a new state
    OrderStateChanged,
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventName::Hello => write!(f, "hello"),
            EventName::CartUpdated => write!(f, "cart_updated"),
            EventName::OrderSubmitted => write!(f, "order_submitted"),
            EventName::OrderStateChanged => write!(f, "order_state_changed"),
        }
    }
}

/// Wire envelope relayed verbatim to connected viewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: EventName,
    pub data: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(event: EventName, data: serde_json::Value) -> Self {
        Self { event, data }
    }

    /// Greeting envelope for a freshly connected viewer.
    pub fn hello(data: serde_json::Value) -> Self {
        Self::new(EventName::Hello, data)
    }
}

/// Broadcast channel scoped to one table's viewers.
pub fn table_channel(table_id: i64) -> String {
    format!("table:{table_id}")
}

/// Venue-wide channel observed by every staff viewer.
pub fn staff_channel() -> &'static str {
    "staff:all"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_snake_case_event_names() {
        let envelope = EventEnvelope::new(
            EventName::CartUpdated,
            serde_json::json!({ "cart_id": "c1" }),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["event"], "cart_updated");
        assert_eq!(json["data"]["cart_id"], "c1");
    }

    #[test]
    fn channel_names() {
        assert_eq!(table_channel(7), "table:7");
        assert_eq!(staff_channel(), "staff:all");
    }
}
