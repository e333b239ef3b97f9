//! Shared types for the QRDine table-ordering engine
//!
//! Common types used by the coordination engine and any transport or
//! storage adapter embedding it: entity models, wire payload shapes,
//! the fanout event envelope, and the structured options mapping.

pub mod event;
pub mod models;
pub mod types;
pub mod wire;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Event re-exports (for convenient access)
pub use event::{EventEnvelope, EventName, staff_channel, table_channel};
