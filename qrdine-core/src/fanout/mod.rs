//! Event fanout bus
//!
//! # Architecture
//!
//! ```text
//! publish(table_id, event, data)
//!         │
//!         ├──▶ broadcast::Sender "table:{id}"  ──▶ that table's viewers
//!         └──▶ broadcast::Sender "staff:all"   ──▶ every staff viewer
//! ```
//!
//! One broadcast channel per topic, created lazily on first use. Staff
//! implicitly observe every table's traffic through the dual publish.
//! Delivery is best-effort at-most-once: no acknowledgement, no replay
//! buffer; a subscriber that falls behind or reconnects re-reads current
//! state instead of catching up from the bus.

use dashmap::DashMap;
use shared::event::{EventEnvelope, EventName, staff_channel, table_channel};
use tokio::sync::broadcast;

/// Topic-keyed broadcast bus.
#[derive(Debug)]
pub struct EventBus {
    channels: DashMap<String, broadcast::Sender<EventEnvelope>>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<EventEnvelope> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Publish one state change to the table's channel and the staff
    /// channel. A channel without subscribers simply drops the event.
    pub fn publish(&self, table_id: i64, event: EventName, data: serde_json::Value) {
        let envelope = EventEnvelope::new(event, data);
        for channel in [table_channel(table_id), staff_channel().to_string()] {
            if self.sender(&channel).send(envelope.clone()).is_err() {
                tracing::debug!(%channel, event = %envelope.event, "no subscribers for event");
            }
        }
    }

    /// Subscribe to an arbitrary topic.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<EventEnvelope> {
        self.sender(channel).subscribe()
    }

    /// Subscribe to one table's events.
    pub fn subscribe_table(&self, table_id: i64) -> broadcast::Receiver<EventEnvelope> {
        self.subscribe(&table_channel(table_id))
    }

    /// Subscribe to the venue-wide staff channel.
    pub fn subscribe_staff(&self) -> broadcast::Receiver<EventEnvelope> {
        self.subscribe(staff_channel())
    }
}
